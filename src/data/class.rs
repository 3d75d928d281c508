use serde::{Deserialize, Serialize};
use std::collections::HashSet;

///one session of a class, as served by the timetable source. the same class appears once per
///timetabled session, so `(id, name)` pairs repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedClass {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub cost: String,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub background_color: String,
    pub age: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
}

impl From<&FlattenedClass> for ClassSummary {
    fn from(value: &FlattenedClass) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

///keeps the first of each `(id, name)` pair, then sorts by name
pub fn unique_by_id_and_name(items: impl IntoIterator<Item = ClassSummary>) -> Vec<ClassSummary> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ClassSummary> = items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect();

    unique.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    unique
}

pub fn summarise(classes: &[FlattenedClass]) -> Vec<ClassSummary> {
    unique_by_id_and_name(classes.iter().map(ClassSummary::from))
}

pub fn find_class<'a>(classes: &'a [FlattenedClass], id: &str) -> Option<&'a FlattenedClass> {
    classes.iter().find(|class| class.id == id)
}

#[cfg(test)]
pub(crate) fn test_class(id: &str, name: &str) -> FlattenedClass {
    FlattenedClass {
        id: id.to_string(),
        name: name.to_string(),
        start_time: "17:00".to_string(),
        end_time: "18:00".to_string(),
        cost: "£8".to_string(),
        days_of_week: vec![1],
        background_color: "#4f46e5".to_string(),
        age: Some("5-8".to_string()),
        description: format!("{name} class"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, name: &str) -> ClassSummary {
        ClassSummary {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn duplicates_are_removed_and_sorted_by_name() {
        let unique = unique_by_id_and_name([
            summary("2", "B"),
            summary("1", "A"),
            summary("1", "A"),
        ]);

        assert_eq!(unique, vec![summary("1", "A"), summary("2", "B")]);
    }

    #[test]
    fn same_id_with_different_name_is_kept() {
        let unique = unique_by_id_and_name([summary("1", "Tumbling"), summary("1", "Acro")]);
        assert_eq!(unique, vec![summary("1", "Acro"), summary("1", "Tumbling")]);
    }

    #[test]
    fn sorting_ignores_case() {
        let unique =
            unique_by_id_and_name([summary("3", "parkour"), summary("4", "Ninja"), summary("5", "Acro")]);
        let names: Vec<_> = unique.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Acro", "Ninja", "parkour"]);
    }

    #[test]
    fn flattened_classes_parse_from_timetable_json() {
        let json = r##"[
            {"id": "7", "name": "Freestyle", "startTime": "18:00", "endTime": "19:00", "cost": "£10",
             "daysOfWeek": [2, 4], "backgroundColor": "#111", "age": null, "description": "All levels"}
        ]"##;
        let classes: Vec<FlattenedClass> = serde_json::from_str(json).unwrap();

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].days_of_week, vec![2, 4]);
        assert_eq!(classes[0].age, None);
        assert_eq!(summarise(&classes), vec![summary("7", "Freestyle")]);
        assert!(find_class(&classes, "7").is_some());
        assert!(find_class(&classes, "8").is_none());
    }
}
