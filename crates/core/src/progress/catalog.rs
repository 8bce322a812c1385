//! The generated problem catalog.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::Difficulty::{Easy, Hard, Medium};
use super::{Difficulty, LeetCodeProblem};
use crate::types::ProblemId;

/// Size of the generated catalog, templates included.
pub const CATALOG_SIZE: usize = 1200;

pub const TOPICS: [&str; 20] = [
    "Array",
    "Two Pointers",
    "String",
    "Linked List",
    "Stack",
    "Queue",
    "Binary Tree",
    "Binary Search Tree",
    "Hash Table",
    "Heap",
    "Graph",
    "Dynamic Programming",
    "Backtracking",
    "Greedy",
    "Trie",
    "Union Find",
    "Binary Search",
    "Sliding Window",
    "Recursion",
    "Sort",
];

pub const COMPANIES: [&str; 15] = [
    "Google",
    "Amazon",
    "Microsoft",
    "Apple",
    "Facebook",
    "Netflix",
    "Uber",
    "Airbnb",
    "LinkedIn",
    "Twitter",
    "Tesla",
    "Spotify",
    "Dropbox",
    "Salesforce",
    "Adobe",
];

pub const LANGUAGES: [&str; 10] = [
    "Python",
    "JavaScript",
    "Java",
    "C++",
    "C",
    "Go",
    "Rust",
    "TypeScript",
    "Swift",
    "Kotlin",
];

const HINTS: [&str; 8] = [
    "Try using a hash map to store intermediate results.",
    "Consider the two-pointer technique.",
    "Think about the edge cases.",
    "Can you solve this recursively?",
    "What if you sort the input first?",
    "Consider using dynamic programming.",
    "Try to find a pattern in the examples.",
    "Can you optimize the space complexity?",
];

struct Template {
    title: &'static str,
    difficulty: Difficulty,
    topics: &'static [&'static str],
    ac_rate: f64,
}

const fn t(
    title: &'static str,
    difficulty: Difficulty,
    topics: &'static [&'static str],
    ac_rate: f64,
) -> Template {
    Template { title, difficulty, topics, ac_rate }
}

const TEMPLATES: [Template; 27] = [
    t("Two Sum", Easy, &["Array", "Hash Table"], 0.52),
    t("Best Time to Buy and Sell Stock", Easy, &["Array", "Dynamic Programming"], 0.54),
    t("Maximum Subarray", Medium, &["Array", "Dynamic Programming"], 0.50),
    t("Product of Array Except Self", Medium, &["Array"], 0.64),
    t("Find Minimum in Rotated Sorted Array", Medium, &["Array", "Binary Search"], 0.46),
    t("Valid Anagram", Easy, &["String", "Hash Table"], 0.63),
    t("Group Anagrams", Medium, &["String", "Hash Table"], 0.67),
    t("Longest Substring Without Repeating Characters", Medium, &["String", "Sliding Window"], 0.35),
    t("Valid Parentheses", Easy, &["String", "Stack"], 0.40),
    t("Reverse Linked List", Easy, &["Linked List"], 0.73),
    t("Merge Two Sorted Lists", Easy, &["Linked List", "Recursion"], 0.62),
    t("Remove Nth Node From End of List", Medium, &["Linked List", "Two Pointers"], 0.39),
    t("Linked List Cycle", Easy, &["Linked List", "Two Pointers"], 0.48),
    t("Maximum Depth of Binary Tree", Easy, &["Binary Tree", "Recursion"], 0.74),
    t("Same Tree", Easy, &["Binary Tree", "Recursion"], 0.57),
    t("Invert Binary Tree", Easy, &["Binary Tree", "Recursion"], 0.76),
    t("Binary Tree Level Order Traversal", Medium, &["Binary Tree", "Queue"], 0.64),
    t("Validate Binary Search Tree", Medium, &["Binary Search Tree", "Recursion"], 0.31),
    t("Climbing Stairs", Easy, &["Dynamic Programming"], 0.52),
    t("House Robber", Medium, &["Dynamic Programming"], 0.48),
    t("Coin Change", Medium, &["Dynamic Programming"], 0.41),
    t("Longest Increasing Subsequence", Medium, &["Dynamic Programming", "Binary Search"], 0.54),
    t("Edit Distance", Hard, &["Dynamic Programming"], 0.53),
    t("Number of Islands", Medium, &["Graph"], 0.57),
    t("Clone Graph", Medium, &["Graph"], 0.51),
    t("Course Schedule", Medium, &["Graph", "Backtracking"], 0.45),
    t("Word Ladder", Hard, &["Graph", "String"], 0.37),
];

/// Title stems for generated problems, keyed by their main topic.
fn title_patterns(topic: &str) -> &'static [&'static str] {
    match topic {
        "Array" => &[
            "Rotate Array",
            "Remove Duplicates",
            "Merge Sorted Arrays",
            "Search in Rotated Array",
            "Find Peak Element",
            "Missing Number",
            "Majority Element",
            "Contains Duplicate",
        ],
        "String" => &[
            "Reverse String",
            "First Unique Character",
            "Valid Palindrome",
            "String to Integer",
            "Implement strStr",
            "Longest Common Prefix",
            "Count and Say",
            "Zigzag Conversion",
        ],
        "Dynamic Programming" => &[
            "Unique Paths",
            "Minimum Path Sum",
            "Triangle",
            "Word Break",
            "Decode Ways",
            "Perfect Squares",
            "Partition Equal Subset Sum",
            "Target Sum",
        ],
        "Graph" => &[
            "Find Path",
            "Shortest Path",
            "Minimum Spanning Tree",
            "Detect Cycle",
            "Topological Sort",
            "Connected Components",
            "Graph Coloring",
            "Network Flow",
        ],
        _ => &["Problem", "Challenge", "Task", "Question"],
    }
}

/// Lowercase, with every non-alphanumeric character replaced by `-`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

pub fn problem_url(slug: &str) -> String {
    format!("https://leetcode.com/problems/{slug}/")
}

/// Difficulty-correlated acceptance rate: `base ± 0.15`, two decimals,
/// clamped to `[0, 1]`.
pub fn acceptance_rate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> f64 {
    let base = match difficulty {
        Difficulty::Easy => 0.6,
        Difficulty::Medium => 0.45,
        Difficulty::Hard => 0.35,
    };
    let raw = base + (rng.random::<f64>() - 0.5) * 0.3;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

fn pick<R: Rng + ?Sized>(pool: &[&str], count: usize, rng: &mut R) -> Vec<String> {
    pool.choose_multiple(rng, count.min(pool.len()))
        .map(|s| (*s).to_string())
        .collect()
}

fn random_companies<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.random_range(2..=9);
    pick(&COMPANIES, count, rng)
}

fn random_hints<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.random_range(1..=3);
    pick(&HINTS, count, rng)
}

fn build_problem<R: Rng + ?Sized>(
    id: ProblemId,
    title: String,
    difficulty: Difficulty,
    topics: Vec<String>,
    ac_rate: f64,
    rng: &mut R,
) -> LeetCodeProblem {
    let slug = slugify(&title);
    LeetCodeProblem {
        id,
        url: problem_url(&slug),
        slug,
        title,
        difficulty,
        topics,
        companies: random_companies(rng),
        is_paid: rng.random_bool(0.3),
        ac_rate,
        hints: random_hints(rng),
        similar: Vec::new(),
    }
}

/// Immutable, process-wide list of problems. Ids are `1..=len`.
#[derive(Debug, Clone)]
pub struct ProblemCatalog {
    problems: Vec<LeetCodeProblem>,
}

impl ProblemCatalog {
    /// Build the 27 template problems plus random fillers up to
    /// [`CATALOG_SIZE`], then link similar problems.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut problems = Vec::with_capacity(CATALOG_SIZE);

        for (index, template) in TEMPLATES.iter().enumerate() {
            problems.push(build_problem(
                index as ProblemId + 1,
                template.title.to_string(),
                template.difficulty,
                template.topics.iter().map(|s| (*s).to_string()).collect(),
                template.ac_rate,
                rng,
            ));
        }

        for index in TEMPLATES.len()..CATALOG_SIZE {
            let id = index as ProblemId + 1;
            let difficulty = *Difficulty::ALL.choose(rng).unwrap_or(&Difficulty::Medium);
            let topic_count = rng.random_range(1..=3);
            let topics = pick(&TOPICS, topic_count, rng);
            let stem = topics
                .first()
                .and_then(|main| title_patterns(main).choose(rng))
                .copied()
                .unwrap_or("Problem");
            let ac_rate = acceptance_rate(difficulty, rng);
            problems.push(build_problem(
                id,
                format!("{stem} {id}"),
                difficulty,
                topics,
                ac_rate,
                rng,
            ));
        }

        link_similar(&mut problems, rng);
        Self { problems }
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn all(&self) -> &[LeetCodeProblem] {
        &self.problems
    }

    pub fn get(&self, id: ProblemId) -> Option<&LeetCodeProblem> {
        // Ids are dense and 1-based.
        let index = (id as usize).checked_sub(1)?;
        self.problems.get(index).filter(|p| p.id == id)
    }

    pub fn by_topic(&self, topic: &str, difficulty: Option<Difficulty>) -> Vec<LeetCodeProblem> {
        self.problems
            .iter()
            .filter(|p| p.has_topic(topic))
            .filter(|p| difficulty.map_or(true, |d| p.difficulty == d))
            .cloned()
            .collect()
    }

    pub fn by_company(&self, company: &str, difficulty: Option<Difficulty>) -> Vec<LeetCodeProblem> {
        self.problems
            .iter()
            .filter(|p| p.has_company(company))
            .filter(|p| difficulty.map_or(true, |d| p.difficulty == d))
            .cloned()
            .collect()
    }
}

/// Give every problem up to three random neighbours sharing a topic.
fn link_similar<R: Rng + ?Sized>(problems: &mut [LeetCodeProblem], rng: &mut R) {
    let topic_sets: Vec<HashSet<String>> = problems
        .iter()
        .map(|p| p.topics.iter().cloned().collect())
        .collect();

    for i in 0..problems.len() {
        let candidates: Vec<ProblemId> = problems
            .iter()
            .enumerate()
            .filter(|(j, other)| {
                *j != i && other.topics.iter().any(|t| topic_sets[i].contains(t))
            })
            .map(|(_, other)| other.id)
            .collect();
        problems[i].similar = candidates.choose_multiple(rng, 3).copied().collect();
    }
}
