use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Visual style bucket for the decorative side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Theme {
    #[serde(rename = "cuda")]
    Cuda,
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "neural")]
    Neural,
    #[serde(rename = "gpu")]
    Gpu,
    #[serde(rename = "simg-default")]
    SimgDefault,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Cuda,
        Theme::Python,
        Theme::Neural,
        Theme::Gpu,
        Theme::SimgDefault,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Cuda => "cuda",
            Self::Python => "python",
            Self::Neural => "neural",
            Self::Gpu => "gpu",
            Self::SimgDefault => "simg-default",
        }
    }

    pub fn from_keyword(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.keyword() == value.trim().to_ascii_lowercase())
    }
}

// Order matters: the first group that matches wins. CUDA vocabulary is
// checked before the GPU group because terms like "occupancy" or
// "scheduling" would otherwise land in the broader hardware bucket.
const CUDA_TERMS: [&str; 11] = [
    "cuda",
    "kernels?",
    "warps?",
    "occupancy",
    "nsight",
    r"profil\w*",
    "ptx",
    r"thread\s*blocks?",
    "scheduling",
    "streaming multiprocessors?",
    "triton",
];

const PYTHON_TERMS: [&str; 9] = [
    "python",
    "numpy",
    "pandas",
    "scipy",
    "jupyter",
    "notebooks?",
    "matplotlib",
    "numba",
    "cupy",
];

const NEURAL_TERMS: [&str; 12] = [
    r"neural\w*",
    "diffusion",
    r"transformers?",
    "generative",
    "deep learning",
    "llms?",
    "attention",
    "gans?",
    "vaes?",
    r"autoencoders?",
    "pytorch",
    "networks?",
];

const GPU_TERMS: [&str; 11] = [
    "gpus?",
    "memory",
    "cache",
    "hbm",
    "vram",
    "bandwidth",
    r"coalesc\w*",
    "architecture",
    "hardware",
    r"tensor\s*cores?",
    "simt",
];

/// Picks the panel theme for an event. Pure and total: the same title and
/// tags always give the same theme, and anything unmatched is
/// [`Theme::SimgDefault`].
pub fn classify(title: &str, tags: &[String]) -> Theme {
    let haystack = search_text(title, tags);
    keyword_groups()
        .iter()
        .find(|(pattern, _)| pattern.is_match(&haystack))
        .map_or(Theme::SimgDefault, |(_, theme)| *theme)
}

fn search_text(title: &str, tags: &[String]) -> String {
    let mut haystack = title.to_lowercase();
    for tag in tags {
        haystack.push(' ');
        haystack.push_str(&tag.to_lowercase());
    }
    haystack
}

fn keyword_groups() -> &'static [(Regex, Theme); 4] {
    static GROUPS: OnceLock<[(Regex, Theme); 4]> = OnceLock::new();
    GROUPS.get_or_init(|| {
        [
            (group_regex(&CUDA_TERMS), Theme::Cuda),
            (group_regex(&PYTHON_TERMS), Theme::Python),
            (group_regex(&NEURAL_TERMS), Theme::Neural),
            (group_regex(&GPU_TERMS), Theme::Gpu),
        ]
    })
}

fn group_regex(terms: &[&str]) -> Regex {
    Regex::new(&format!(r"\b(?:{})\b", terms.join("|")))
        .expect("theme keyword regex should compile")
}
