//! src/services/catalog.rs
//!
//! In-memory scholarship and competition catalog. Entries are seeded at
//! startup and read-only for the life of the process; only the saved-id
//! set changes at runtime, and that lives in the application state.

use crate::models::scholarship::{Category, Scholarship, ScholarshipConditions};

pub struct ScholarshipCatalog {
    entries: Vec<Scholarship>,
}

impl ScholarshipCatalog {
    pub fn seeded() -> Self {
        Self {
            entries: seed_scholarships(),
        }
    }

    /// Every entry, in seed order.
    pub fn all(&self) -> &[Scholarship] {
        &self.entries
    }

    pub fn by_id(&self, id: &str) -> Option<&Scholarship> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn by_category(&self, category: Category) -> Vec<Scholarship> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }
}

fn names(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|value| value.to_string()).collect())
}

fn seed_scholarships() -> Vec<Scholarship> {
    vec![
        Scholarship {
            id: "1".into(),
            title: "2025 강원대학교 성적우수 장학금".into(),
            summary: "직전학기 성적 3.5 이상 학생 대상, 등록금 50% 지원".into(),
            organization: "강원대학교 학생처".into(),
            amount: "최대 300만원".into(),
            deadline: "2025-12-15".into(),
            application_link: "https://kangwon.ac.kr".into(),
            conditions: ScholarshipConditions {
                grade: names(&["2학년", "3학년", "4학년"]),
                gpa: Some(3.5),
                ..Default::default()
            },
            category: Category::Scholarship,
            source: "강원대 공지사항".into(),
            is_new: true,
            view_count: 1247,
        },
        Scholarship {
            id: "2".into(),
            title: "SW중심대학 코딩캠프 참가자 장학금".into(),
            summary: "SW전공생 대상, 캠프 수료 후 장학금 지급".into(),
            organization: "SW사업단".into(),
            amount: "100만원".into(),
            deadline: "2025-12-01".into(),
            application_link: "https://sw.kangwon.ac.kr".into(),
            conditions: ScholarshipConditions {
                major: names(&["컴퓨터공학", "소프트웨어학과", "정보통신공학"]),
                grade: names(&["1학년", "2학년", "3학년"]),
                ..Default::default()
            },
            category: Category::Scholarship,
            source: "SW사업단 홈페이지".into(),
            is_new: true,
            view_count: 856,
        },
        Scholarship {
            id: "3".into(),
            title: "2025 스타트업 아이디어 공모전".into(),
            summary: "창업 아이디어 기획서 제출, 최우수상 500만원".into(),
            organization: "교육혁신본부".into(),
            amount: "최대 500만원".into(),
            deadline: "2025-11-30".into(),
            application_link: "https://innovation.kangwon.ac.kr".into(),
            conditions: ScholarshipConditions {
                grade: names(&["2학년", "3학년", "4학년"]),
                ..Default::default()
            },
            category: Category::Competition,
            source: "교육혁신본부".into(),
            is_new: false,
            view_count: 2341,
        },
        Scholarship {
            id: "4".into(),
            title: "저소득층 생활비 지원 장학금".into(),
            summary: "기초생활수급자 및 차상위계층 대상".into(),
            organization: "강원대학교 학생처".into(),
            amount: "학기당 200만원".into(),
            deadline: "2025-12-20".into(),
            application_link: "https://kangwon.ac.kr".into(),
            conditions: ScholarshipConditions {
                income: Some("기초생활수급자".into()),
                ..Default::default()
            },
            category: Category::Scholarship,
            source: "강원대 공지사항".into(),
            is_new: false,
            view_count: 945,
        },
        Scholarship {
            id: "5".into(),
            title: "외국어 자격증 취득 장려 장학금".into(),
            summary: "TOEIC 800점 이상 또는 동등 자격증 소지자".into(),
            organization: "취업지원과".into(),
            amount: "50만원".into(),
            deadline: "2025-12-10".into(),
            application_link: "https://career.kangwon.ac.kr".into(),
            conditions: ScholarshipConditions {
                certificates: names(&["TOEIC", "TOEFL", "IELTS"]),
                ..Default::default()
            },
            category: Category::Scholarship,
            source: "취업지원과".into(),
            is_new: true,
            view_count: 1523,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_five_entries_in_order() {
        let catalog = ScholarshipCatalog::seeded();
        let ids: Vec<&str> = catalog.all().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn category_filter_splits_scholarships_from_competitions() {
        let catalog = ScholarshipCatalog::seeded();
        assert_eq!(catalog.by_category(Category::Scholarship).len(), 4);

        let competitions = catalog.by_category(Category::Competition);
        assert_eq!(competitions.len(), 1);
        assert_eq!(competitions[0].id, "3");
    }

    #[test]
    fn lookup_by_id_finds_known_entries_only() {
        let catalog = ScholarshipCatalog::seeded();
        assert_eq!(
            catalog.by_id("3").map(|s| s.title.as_str()),
            Some("2025 스타트업 아이디어 공모전")
        );
        assert!(catalog.by_id("99").is_none());
        assert!(catalog.contains("5"));
        assert!(!catalog.contains("0"));
    }

    #[test]
    fn entries_serialize_with_camel_case_and_explicit_condition_nulls() {
        let catalog = ScholarshipCatalog::seeded();
        let value = serde_json::to_value(catalog.by_id("1").unwrap()).unwrap();
        assert_eq!(value["applicationLink"], "https://kangwon.ac.kr");
        assert_eq!(value["isNew"], true);
        assert_eq!(value["viewCount"], 1247);
        assert_eq!(value["conditions"]["gpa"], 3.5);
        assert!(value["conditions"]["major"].is_null());
    }
}
