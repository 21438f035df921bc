// Gap scoring: weighted match score, ranked gaps, remediation estimates, learning recommendations.

pub mod gap_scorer;
pub mod recommendations;
pub mod remediation;
