/// Seniority tier derived from title keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Staff,
    Manager,
    Director,
}

// Checked in priority order: a "Senior Engineering Manager" is a manager,
// not a senior IC, so the broader tiers must win before "senior" is tried.
const DIRECTOR_KEYWORDS: &[&str] = &["director", "vp", "vice president", "chief", "cto", "ceo", "head of"];
const MANAGER_KEYWORDS: &[&str] = &["manager", "team lead", "team-lead", "engineering lead"];
const STAFF_KEYWORDS: &[&str] = &["staff", "principal", "architect"];
const SENIOR_KEYWORDS: &[&str] = &["senior", "sr"];
const JUNIOR_KEYWORDS: &[&str] = &["junior", "jr", "intern", "entry"];

impl Seniority {
    pub fn classify(title: &str) -> Self {
        let title = title.to_lowercase();
        let matches_any = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

        if matches_any(DIRECTOR_KEYWORDS) {
            Seniority::Director
        } else if matches_any(MANAGER_KEYWORDS) {
            Seniority::Manager
        } else if matches_any(STAFF_KEYWORDS) {
            Seniority::Staff
        } else if matches_any(SENIOR_KEYWORDS) {
            Seniority::Senior
        } else if matches_any(JUNIOR_KEYWORDS) {
            Seniority::Junior
        } else {
            Seniority::Mid
        }
    }

    pub const ALL: [Seniority; 6] = [
        Seniority::Junior,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Staff,
        Seniority::Manager,
        Seniority::Director,
    ];
}

#[cfg(test)]
mod tests {
    use super::Seniority;

    #[test]
    fn classifies_plain_tiers() {
        assert_eq!(Seniority::classify("Software Engineer"), Seniority::Mid);
        assert_eq!(Seniority::classify("Senior Software Engineer"), Seniority::Senior);
        assert_eq!(Seniority::classify("Junior Backend Developer"), Seniority::Junior);
        assert_eq!(Seniority::classify("Staff Engineer"), Seniority::Staff);
        assert_eq!(Seniority::classify("Principal Architect"), Seniority::Staff);
    }

    #[test]
    fn higher_tiers_win_over_senior() {
        assert_eq!(Seniority::classify("Senior Engineering Manager"), Seniority::Manager);
        assert_eq!(Seniority::classify("Senior Director of Engineering"), Seniority::Director);
        assert_eq!(Seniority::classify("Senior Staff Engineer"), Seniority::Staff);
    }

    #[test]
    fn executive_keywords_map_to_director() {
        assert_eq!(Seniority::classify("VP R&D"), Seniority::Director);
        assert_eq!(Seniority::classify("Chief Technology Officer"), Seniority::Director);
        assert_eq!(Seniority::classify("Head of Platform"), Seniority::Director);
    }

    #[test]
    fn entry_keywords_map_to_junior() {
        assert_eq!(Seniority::classify("Engineering Intern"), Seniority::Junior);
        assert_eq!(Seniority::classify("Entry Level QA"), Seniority::Junior);
    }
}
