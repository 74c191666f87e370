//! Access checks run before any dashboard command.
//!
//! Both checks produce a plain yes/no; the dashboard itself never authorises anything.

/// Compare a supplied passcode with the configured secret in constant time.
///
/// The supplied value is trimmed. An empty secret never matches.
pub fn passcode_matches(given: &str, secret: &str) -> bool {
    let given = given.trim().as_bytes();
    let secret = secret.as_bytes();
    if secret.is_empty() || given.len() != secret.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (a, b) in given.iter().zip(secret) {
        diff |= a ^ b;
    }
    diff == 0
}

/// Whether `email` belongs to one of `domains` or a subdomain of one.
///
/// The address is trimmed and lower-cased and must contain exactly one `@`.
pub fn is_email_allowed<S: AsRef<str>>(email: &str, domains: &[S]) -> bool {
    let normalized = email.trim().to_lowercase();
    let mut parts = normalized.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domains.iter().any(|allowed| {
        let allowed = allowed.as_ref().trim().to_lowercase();
        !allowed.is_empty() && (domain == allowed || domain.ends_with(&format!(".{allowed}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAINS: [&str; 2] = ["hec.edu", "hec.fr"];

    #[test]
    fn passcode_must_match_exactly() {
        assert!(passcode_matches(" letmein ", "letmein"));
        assert!(!passcode_matches("letmeout", "letmein"));
        assert!(!passcode_matches("letmein2", "letmein"));
        assert!(!passcode_matches("", ""));
    }

    #[test]
    fn allowed_domains_and_subdomains() {
        assert!(is_email_allowed("Jane.Doe@HEC.edu ", &DOMAINS));
        assert!(is_email_allowed("jd@students.hec.fr", &DOMAINS));
        assert!(!is_email_allowed("jd@nothec.fr", &DOMAINS));
        assert!(!is_email_allowed("jd@hec.fr.evil.com", &DOMAINS));
        assert!(!is_email_allowed("a@b@hec.fr", &DOMAINS));
        assert!(!is_email_allowed("no-at-sign", &DOMAINS));
        assert!(!is_email_allowed("@hec.fr", &DOMAINS));
    }
}
