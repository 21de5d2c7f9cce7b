//! Controlled vocabularies shared by the extraction prompt and the
//! worksheet row builders.
//!
//! Every facet worksheet has one column per vocabulary entry (plus the id
//! column), so the order here must match the column order in the sheet.
//! The extraction prompt quotes these lists verbatim so the LLM can only
//! answer inside them.

pub const GRADES: &[&str] = &["Junior", "Middle", "Senior", "Lead", "Architect"];

pub const ROLES: &[&str] = &[
    "Python Developer",
    "Java Developer",
    "JavaScript Developer",
    "Frontend Developer",
    "Backend Developer",
    "Fullstack Developer",
    "Mobile Developer",
    "DevOps Engineer",
    "Data Scientist",
    "Data Engineer",
    "QA Engineer",
    "Business Analyst",
    "System Analyst",
    "Project Manager",
    "Product Manager",
    "UI/UX Designer",
    "1C Developer",
    "Salesforce Developer",
];

pub const PROGRAMMING_LANGUAGES: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "TypeScript",
    "C#",
    "C++",
    "C",
    "Go",
    "Rust",
    "Kotlin",
    "Swift",
    "PHP",
    "Ruby",
    "Scala",
    "Dart",
    "Objective-C",
    "1C",
    "SQL",
];

pub const FRAMEWORKS: &[&str] = &[
    "Django",
    "FastAPI",
    "Flask",
    "Spring Boot",
    ".NET",
    "React",
    "Angular",
    "Vue.js",
    "Node.js",
    "Express",
    "NestJS",
    "Laravel",
    "Symfony",
    "Ruby on Rails",
    "Flutter",
    "React Native",
    "Next.js",
    "Nuxt.js",
];

pub const TECHNOLOGIES: &[&str] = &[
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "Docker",
    "Kubernetes",
    "AWS",
    "GCP",
    "Azure",
    "Kafka",
    "RabbitMQ",
    "Elasticsearch",
    "Git",
    "CI/CD",
    "Linux",
    "Nginx",
    "GraphQL",
    "gRPC",
];

pub const PROJECT_INDUSTRIES: &[&str] = &[
    "FinTech",
    "Healthcare",
    "E-commerce",
    "EdTech",
    "Logistics",
    "Telecom",
    "Gaming",
    "Media",
    "Real Estate",
    "Travel",
    "Insurance",
    "Retail",
    "Energy",
    "Government",
];

pub const FOREIGN_LANGUAGES: &[&str] = &[
    "English",
    "German",
    "French",
    "Spanish",
    "Italian",
    "Chinese (Mandarin)",
    "Japanese",
    "Korean",
    "Portuguese",
    "Polish",
    "Arabic",
    "Turkish",
    "Hindi",
    "Ukrainian",
    "Czech",
    "Dutch",
    "Swedish",
    "Norwegian",
    "Finnish",
];

pub const PORTFOLIO: &[&str] = &[
    "GitHub",
    "GitLab",
    "LinkedIn",
    "Behance",
    "Dribbble",
    "Medium",
    "Personal Website",
    "Habr Career",
];

pub const WORK_SCHEDULES: &[&str] = &["Full-time", "Part-time", "Contract", "Hourly"];

pub const EMPLOYMENT_FORMS: &[&str] = &[
    "Оформление в штат",
    "B2B contract",
    "ИП",
    "Самозанятый",
    "ГПХ",
];

pub const AVAILABILITY: &[&str] = &[
    "Open to offers",
    "Considering offers",
    "Not looking",
    "On project",
];

/// JSON field names of the `contacts` object, in worksheet column order.
pub const CONTACT_FIELDS: &[&str] = &[
    "phone",
    "email",
    "telegram",
    "linkedin",
    "skype",
    "github",
    "gitlab",
    "whatsapp",
    "viber",
    "discord",
    "slack",
    "microsoftTeams",
    "zoom",
    "googleMeet",
    "facebook",
    "instagram",
    "twitter",
    "vk",
    "tiktok",
    "reddit",
    "stackoverflow",
    "habrCareer",
];

/// Human labels offered by the add-info contact keyboard, mapped to the
/// worksheet/JSON contact field they update.
pub const CONTACT_KINDS: &[(&str, &str)] = &[
    ("Телефон", "phone"),
    ("E-mail", "email"),
    ("Telegram", "telegram"),
    ("LinkedIn", "linkedin"),
    ("Skype", "skype"),
    ("GitHub", "github"),
    ("GitLab", "gitlab"),
    ("WhatsApp", "whatsapp"),
    ("Viber", "viber"),
    ("Discord", "discord"),
    ("Slack", "slack"),
    ("Microsoft Teams", "microsoftTeams"),
    ("Zoom", "zoom"),
    ("Google Meet", "googleMeet"),
    ("Facebook", "facebook"),
    ("Instagram", "instagram"),
    ("X (Twitter)", "twitter"),
    ("VK", "vk"),
    ("TikTok", "tiktok"),
    ("Reddit", "reddit"),
    ("Stack Overflow", "stackoverflow"),
    ("Habr Career", "habrCareer"),
];

/// Renders a vocabulary as `"A", "B", "C"` for prompt interpolation.
pub fn quoted_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_list() {
        assert_eq!(quoted_list(&["Junior", "Middle"]), r#""Junior", "Middle""#);
    }

    #[test]
    fn test_contact_kinds_point_at_known_fields() {
        for (_, field) in CONTACT_KINDS {
            assert!(CONTACT_FIELDS.contains(field), "unknown field {field}");
        }
    }

    #[test]
    fn test_vocabularies_have_no_duplicates() {
        for vocab in [
            GRADES,
            ROLES,
            PROGRAMMING_LANGUAGES,
            FRAMEWORKS,
            TECHNOLOGIES,
            PROJECT_INDUSTRIES,
            FOREIGN_LANGUAGES,
            PORTFOLIO,
            WORK_SCHEDULES,
            EMPLOYMENT_FORMS,
            AVAILABILITY,
            CONTACT_FIELDS,
        ] {
            let mut seen = std::collections::HashSet::new();
            for v in vocab {
                assert!(seen.insert(v.to_lowercase()), "duplicate entry {v}");
            }
        }
    }
}
