use serde::{Deserialize, Serialize};

/// One row as served by the `/api/datasubrows` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: String,
    pub age: i64,
    #[serde(default, alias = "subRows", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Person>>,
}

impl Person {
    pub fn sub_rows(&self) -> &[Person] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Person;

    pub fn person(id: i64, first_name: &str, age: i64) -> Person {
        Person {
            id,
            first_name: first_name.to_string(),
            last_name: format!("{first_name}son"),
            email: format!("{}@example.com", first_name.to_lowercase()),
            job_title: "Engineer".to_string(),
            age,
            children: None,
        }
    }

    pub fn with_children(mut parent: Person, children: Vec<Person>) -> Person {
        parent.children = Some(children);
        parent
    }

    pub fn people(n: i64) -> Vec<Person> {
        (1..=n).map(|i| person(i, &format!("P{i}"), 20 + i)).collect()
    }
}
