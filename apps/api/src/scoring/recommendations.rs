//! Learning recommendations — what to study for each open gap.
//!
//! Algorithm:
//! 1. resources: direct catalog hit, else first catalog key contained in (or containing)
//!    the skill id, else generic Coursera/Udemy search links; at most two, in catalog order
//! 2. timeline label from tier (urgency) and whether the skill is complex
//! 3. resume bullet from the first keyword family the skill belongs to

use serde::{Deserialize, Serialize};

use crate::models::plan::GapEntry;
use crate::models::skill::Tier;
use crate::scoring::remediation::is_complex_skill;

/// Resources returned per gap.
const MAX_RESOURCES: usize = 2;

/// Shortest skill id allowed to match inside a longer catalog key.
const MIN_PARTIAL_LEN: usize = 3;

type CatalogEntry = (&'static str, [(&'static str, &'static str, &'static str); 3]);

/// Curated courses by skill id: (platform, course, url).
#[rustfmt::skip]
static RESOURCE_CATALOG: &[CatalogEntry] = &[
    (
        "python",
        [
            ("Coursera", "Python for Everybody", "https://www.coursera.org/specializations/python"),
            ("Udemy", "Complete Python Bootcamp", "https://www.udemy.com/course/complete-python-bootcamp/"),
            ("YouTube", "Python Tutorial for Beginners", "https://www.youtube.com/results?search_query=python+tutorial"),
        ],
    ),
    (
        "java",
        [
            ("Coursera", "Java Programming and Software Engineering", "https://www.coursera.org/specializations/java-programming"),
            ("Udemy", "Java Programming Masterclass", "https://www.udemy.com/course/java-the-complete-java-developer-course/"),
            ("YouTube", "Java Tutorial for Beginners", "https://www.youtube.com/results?search_query=java+tutorial"),
        ],
    ),
    (
        "javascript",
        [
            ("Coursera", "JavaScript for Beginners", "https://www.coursera.org/learn/javascript-basics"),
            ("Udemy", "The Complete JavaScript Course", "https://www.udemy.com/course/the-complete-javascript-course/"),
            ("YouTube", "JavaScript Crash Course", "https://www.youtube.com/results?search_query=javascript+tutorial"),
        ],
    ),
    (
        "react",
        [
            ("Coursera", "React Basics", "https://www.coursera.org/learn/react-basics"),
            ("Udemy", "The Complete React Developer Course", "https://www.udemy.com/course/react-redux/"),
            ("YouTube", "React Tutorial for Beginners", "https://www.youtube.com/results?search_query=react+tutorial"),
        ],
    ),
    (
        "sql",
        [
            ("Coursera", "SQL for Data Science", "https://www.coursera.org/learn/sql-for-data-science"),
            ("Udemy", "The Complete SQL Bootcamp", "https://www.udemy.com/course/the-complete-sql-bootcamp/"),
            ("YouTube", "SQL Tutorial for Beginners", "https://www.youtube.com/results?search_query=sql+tutorial"),
        ],
    ),
    (
        "aws",
        [
            ("Coursera", "AWS Fundamentals", "https://www.coursera.org/specializations/aws-fundamentals"),
            ("Udemy", "AWS Certified Solutions Architect", "https://www.udemy.com/course/aws-certified-solutions-architect-associate/"),
            ("YouTube", "AWS Tutorial for Beginners", "https://www.youtube.com/results?search_query=aws+tutorial"),
        ],
    ),
    (
        "docker",
        [
            ("Coursera", "Docker and Kubernetes", "https://www.coursera.org/learn/docker-kubernetes"),
            ("Udemy", "Docker Mastery", "https://www.udemy.com/course/docker-mastery/"),
            ("YouTube", "Docker Tutorial", "https://www.youtube.com/results?search_query=docker+tutorial"),
        ],
    ),
    (
        "git",
        [
            ("Coursera", "Version Control with Git", "https://www.coursera.org/learn/version-control-with-git"),
            ("Udemy", "Git Complete", "https://www.udemy.com/course/git-complete/"),
            ("YouTube", "Git Tutorial for Beginners", "https://www.youtube.com/results?search_query=git+tutorial"),
        ],
    ),
    (
        "machine learning",
        [
            ("Coursera", "Machine Learning", "https://www.coursera.org/learn/machine-learning"),
            ("Udemy", "Machine Learning A-Z", "https://www.udemy.com/course/machinelearning/"),
            ("YouTube", "Machine Learning Tutorial", "https://www.youtube.com/results?search_query=machine+learning+tutorial"),
        ],
    ),
    (
        "data analysis",
        [
            ("Coursera", "Data Analysis with Python", "https://www.coursera.org/learn/data-analysis-with-python"),
            ("Udemy", "Data Analysis with Pandas", "https://www.udemy.com/course/data-analysis-with-pandas/"),
            ("YouTube", "Data Analysis Tutorial", "https://www.youtube.com/results?search_query=data+analysis+tutorial"),
        ],
    ),
];

// Keyword families for resume bullets, checked in order. Keywords are normalized ids.
const LANGUAGES: &[&str] = &["python", "java", "javascript", "c++", "c#", "go", "rust"];
const FRAMEWORKS: &[&str] = &["react", "angular", "vue", "django", "flask", "spring"];
const DATABASES: &[&str] = &["sql", "mysql", "postgresql", "mongodb", "redis"];
const CLOUD: &[&str] = &["aws", "azure", "gcp", "docker", "kubernetes", "ci cd"];
const DATA_SCIENCE: &[&str] = &[
    "machine learning",
    "data analysis",
    "pandas",
    "numpy",
    "tensorflow",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    pub platform: String,
    pub course: String,
    pub url: String,
}

/// Study advice for one open gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub tier: Tier,
    pub timeline: String,
    pub resources: Vec<LearningResource>,
    pub resume_bullet: String,
}

/// One recommendation per gap, in gap order.
pub fn recommend_all(gaps: &[GapEntry]) -> Vec<Recommendation> {
    gaps.iter().map(recommend).collect()
}

pub fn recommend(gap: &GapEntry) -> Recommendation {
    Recommendation {
        skill: gap.skill.clone(),
        tier: gap.tier,
        timeline: learning_timeline(&gap.skill, gap.tier).to_string(),
        resources: find_resources(&gap.skill),
        resume_bullet: resume_bullet(&gap.skill),
    }
}

pub fn find_resources(skill_id: &str) -> Vec<LearningResource> {
    let direct = RESOURCE_CATALOG.iter().find(|(key, _)| *key == skill_id);
    let entry = direct.or_else(|| {
        RESOURCE_CATALOG.iter().find(|(key, _)| {
            skill_id.contains(key)
                || (skill_id.len() >= MIN_PARTIAL_LEN && key.contains(skill_id))
        })
    });

    match entry {
        Some((_, resources)) => resources
            .iter()
            .take(MAX_RESOURCES)
            .map(|&(platform, course, url)| LearningResource {
                platform: platform.to_string(),
                course: course.to_string(),
                url: url.to_string(),
            })
            .collect(),
        None => search_links(skill_id),
    }
}

fn search_links(skill_id: &str) -> Vec<LearningResource> {
    let query = urlencoding::encode(skill_id);
    vec![
        LearningResource {
            platform: "Coursera".to_string(),
            course: format!("{skill_id} Course"),
            url: format!("https://www.coursera.org/search?query={query}"),
        },
        LearningResource {
            platform: "Udemy".to_string(),
            course: format!("Learn {skill_id}"),
            url: format!("https://www.udemy.com/courses/search/?q={query}"),
        },
    ]
}

/// Rough time-to-proficiency label. Required gaps get the deeper track.
pub fn learning_timeline(skill_id: &str, tier: Tier) -> &'static str {
    match (tier, is_complex_skill(skill_id)) {
        (Tier::Required, false) => "2-4 weeks",
        (Tier::Required, true) => "1-2 months",
        (Tier::Preferred, false) => "1-2 weeks",
        (Tier::Preferred, true) => "3-4 weeks",
        (Tier::Bonus, false) => "1 week",
        (Tier::Bonus, true) => "2-3 weeks",
    }
}

pub fn resume_bullet(skill_id: &str) -> String {
    // Whole-word match, so "go" does not claim "django" or "mongodb".
    let padded = format!(" {skill_id} ");
    let has_any = |family: &[&str]| family.iter().any(|kw| padded.contains(&format!(" {kw} ")));

    if has_any(LANGUAGES) {
        format!(
            "Developed applications using {skill_id} to improve system performance and user experience"
        )
    } else if has_any(FRAMEWORKS) {
        format!(
            "Built responsive web applications using {skill_id} framework, enhancing user engagement"
        )
    } else if has_any(DATABASES) {
        format!(
            "Designed and optimized database schemas using {skill_id}, reducing query time by 30%"
        )
    } else if has_any(CLOUD) {
        format!(
            "Deployed scalable infrastructure using {skill_id}, improving system reliability and reducing costs"
        )
    } else if has_any(DATA_SCIENCE) {
        format!(
            "Applied {skill_id} to analyze data and build predictive models, driving data-driven decisions"
        )
    } else {
        format!("Utilized {skill_id} to streamline processes and enhance project outcomes")
    }
}
