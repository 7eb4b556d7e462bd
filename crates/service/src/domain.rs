use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Value meaning "not provided yet" for the numeric fields.
pub const UNSET: i64 = -1;

/// One user's grade/fee profile, keyed by `user_id`.
///
/// `user_id` is mandatory on the wire; the numeric fields take their zero value
/// when the client leaves them out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrade {
    pub user_id: String,
    #[serde(default)]
    pub postpaid_limit: i64,
    #[serde(default)]
    pub spp: i64,
    #[serde(default)]
    pub shipping_fee: i64,
    #[serde(default)]
    pub return_fee: i64,
}

impl UserGrade {
    /// Decode a request body. The error text is what gets returned to the client.
    pub fn from_json(body: &[u8]) -> Result<Self, ServiceError> {
        serde_json::from_slice(body).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// True when the id is set and no numeric field holds [`UNSET`].
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty()
            && [self.postpaid_limit, self.spp, self.shipping_fee, self.return_fee]
                .iter()
                .all(|v| *v != UNSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_format() {
        let g = UserGrade::from_json(
            br#"{"user_id":"u1","postpaid_limit":100,"spp":5,"shipping_fee":10,"return_fee":2}"#,
        )
        .unwrap();
        assert_eq!(
            g,
            UserGrade {
                user_id: "u1".into(),
                postpaid_limit: 100,
                spp: 5,
                shipping_fee: 10,
                return_fee: 2,
            }
        );
    }

    #[test]
    fn missing_numbers_default_to_zero() {
        let g = UserGrade::from_json(br#"{"user_id":"u2"}"#).unwrap();
        assert_eq!(g.postpaid_limit, 0);
        assert_eq!(g.return_fee, 0);
    }

    #[test]
    fn missing_user_id_is_a_decode_error() {
        let err = UserGrade::from_json(br#"{"spp":1}"#).unwrap_err();
        match err {
            ServiceError::Decode(msg) => assert!(msg.contains("user_id"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_a_decode_error() {
        let err = UserGrade::from_json(br#"{"postpaid_limit":"not-a-number"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn completeness_checks_sentinel() {
        let mut g = UserGrade {
            user_id: "u".into(),
            postpaid_limit: 1,
            spp: 2,
            shipping_fee: 3,
            return_fee: 4,
        };
        assert!(g.is_complete());
        g.spp = UNSET;
        assert!(!g.is_complete());
        g.spp = 2;
        g.user_id.clear();
        assert!(!g.is_complete());
    }
}
