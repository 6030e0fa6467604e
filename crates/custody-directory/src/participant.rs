//! The participant record.

use serde::{Deserialize, Serialize};

/// A registered ledger participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier.
    #[serde(rename = "participantID")]
    pub participant_id: String,
    /// Role label, e.g. `FirstResponder`.
    pub role: String,
    /// Organization of the caller that registered this participant.
    #[serde(rename = "orgID")]
    pub org_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let p = Participant {
            participant_id: "alice".into(),
            role: "Investigator".into(),
            org_id: "Org1MSP".into(),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["participantID"], "alice");
        assert_eq!(json["role"], "Investigator");
        assert_eq!(json["orgID"], "Org1MSP");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
