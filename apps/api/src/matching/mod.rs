// Skill matching: exact identifier hits plus oracle-scored paraphrases.

pub mod matcher;
pub mod similarity;
