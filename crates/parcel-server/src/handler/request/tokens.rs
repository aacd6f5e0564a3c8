use jiff::civil::Date;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /tokens`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateToken {
    /// Name of the client the token is issued to; becomes the subject.
    pub name: String,
    /// Day the token expires, as `YYYY-MM-DD`. The token stops being
    /// accepted at 00:00 UTC that day. An empty string counts as absent.
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub expiration_date: Option<Date>,
}

fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => date.parse().map(Some).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_date() -> anyhow::Result<()> {
        let request: CreateToken =
            serde_json::from_str(r#"{"name":"ci","expirationDate":"2030-01-31"}"#)?;
        assert_eq!(request.name, "ci");
        assert_eq!(request.expiration_date, Some(Date::new(2030, 1, 31)?));
        Ok(())
    }

    #[test]
    fn test_deserialize_without_date() -> anyhow::Result<()> {
        let request: CreateToken = serde_json::from_str(r#"{"name":"ci"}"#)?;
        assert!(request.expiration_date.is_none());
        Ok(())
    }

    #[test]
    fn test_empty_date_is_absent() -> anyhow::Result<()> {
        for body in [
            r#"{"name":"ci","expirationDate":""}"#,
            r#"{"name":"ci","expirationDate":null}"#,
        ] {
            let request: CreateToken = serde_json::from_str(body)?;
            assert!(request.expiration_date.is_none(), "body: {body}");
        }
        Ok(())
    }

    #[test]
    fn test_reject_malformed_date() {
        let body = r#"{"name":"ci","expirationDate":"31/01/2030"}"#;
        assert!(serde_json::from_str::<CreateToken>(body).is_err());
    }
}
