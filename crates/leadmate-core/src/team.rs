use crate::types::EntityId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TeamMember
// ---------------------------------------------------------------------------

/// A team member record derived server-side from resume parsing.
/// Read-only in this client after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub project_id: Option<EntityId>,
}

impl TeamMember {
    pub fn knows(&self, tech: &str) -> bool {
        self.tech_stack.iter().any(|t| t.eq_ignore_ascii_case(tech))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tech_stack_lookup_is_case_insensitive() {
        let m = TeamMember {
            id: EntityId::new("m1"),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
            tech_stack: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            project_id: None,
        };
        assert!(m.knows("rust"));
        assert!(!m.knows("elixir"));
    }
}
