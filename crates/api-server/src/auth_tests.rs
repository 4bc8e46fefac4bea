#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("abcd1234efgh5678"), "abcd...5678");
        assert_eq!(mask_api_key("short"), "****");
    }

    #[test]
    fn test_extract_api_key_from_x_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("test_key_123"));
        assert_eq!(extract_api_key(&headers).unwrap(), "test_key_123");
    }

    #[test]
    fn test_extract_api_key_from_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer bearer_token_456"));
        assert_eq!(extract_api_key(&headers).unwrap(), "bearer_token_456");
    }

    #[test]
    fn test_x_api_key_takes_priority_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("from_header"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer from_bearer"));
        assert_eq!(extract_api_key(&headers).unwrap(), "from_header");
    }

    #[test]
    fn test_missing_or_empty_key() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_api_key(&headers), Err(AuthError::MissingApiKey)));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(matches!(extract_api_key(&headers), Err(AuthError::MissingApiKey)));
    }

    #[test]
    fn test_parse_staff_keys() {
        let keys = parse_staff_keys("alpha, beta:viewer ,gamma:staff,,delta:unknown");
        assert_eq!(keys.len(), 4);
        assert_eq!(keys.get(&hash_key("alpha")), Some(&Role::Staff));
        assert_eq!(keys.get(&hash_key("beta")), Some(&Role::Viewer));
        assert_eq!(keys.get(&hash_key("gamma")), Some(&Role::Staff));
        assert_eq!(keys.get(&hash_key("delta")), Some(&Role::Viewer));
        // Raw keys are never stored
        assert!(!keys.contains_key("alpha"));
    }

    #[test]
    fn test_authorize() {
        let keys = parse_staff_keys("staffkey,readkey:viewer");

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("staffkey"));
        assert_eq!(authorize(&keys, &headers, Role::Staff).unwrap(), Role::Staff);

        headers.insert("X-API-Key", HeaderValue::from_static("readkey"));
        assert!(matches!(
            authorize(&keys, &headers, Role::Staff),
            Err(AuthError::InsufficientRole(Role::Staff))
        ));

        headers.insert("X-API-Key", HeaderValue::from_static("nope"));
        assert!(matches!(authorize(&keys, &headers, Role::Staff), Err(AuthError::InvalidApiKey)));
    }

    #[test]
    fn test_no_keys_configured_denies() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("anything"));
        assert!(matches!(
            authorize(&HashMap::new(), &headers, Role::Staff),
            Err(AuthError::NotConfigured)
        ));
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Staff > Role::Viewer);
        assert_eq!(Role::from_str("STAFF"), Some(Role::Staff));
        assert_eq!(Role::from_str("admin"), None);
        assert_eq!(Role::Staff.to_string(), "staff");
    }
}
