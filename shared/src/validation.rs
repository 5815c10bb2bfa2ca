use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Why a sign-up was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NotLowercase,
    SyntaxInvalid,
    DisposableDomain,
}

/// Admission decision for a candidate email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Allowed,
    Rejected(RejectionReason),
}

/// Immutable set of known disposable email domains.
///
/// The bundled list is loaded once per process at first use and is read-only
/// afterwards, so it can be shared across invocations without locking.
#[derive(Debug, Clone)]
pub struct DisposableDomainSet {
    domains: HashSet<String>,
}

static BUNDLED: Lazy<DisposableDomainSet> = Lazy::new(|| {
    DisposableDomainSet::from_lines(include_str!("../resources/email-domain-blacklist.txt"))
});

impl DisposableDomainSet {
    /// Build a set from newline-separated domains, one per line.
    pub fn from_lines(lines: &str) -> Self {
        let domains = lines
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.to_ascii_lowercase())
            .collect();
        Self { domains }
    }

    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains = domains
            .into_iter()
            .map(|domain| domain.into().to_ascii_lowercase())
            .collect();
        Self { domains }
    }

    /// The reference list shipped with the binary.
    pub fn bundled() -> &'static DisposableDomainSet {
        &BUNDLED
    }

    /// Membership test, case-insensitive regardless of how the set was built.
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Check basic email syntax: a non-empty local part and a dotted domain made
/// of well-formed labels. Accepts common RFC-5321 addresses, nothing exotic
/// (no quoted local parts, no address literals).
pub fn is_valid_email_syntax(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }
    if !local.chars().all(is_atext_or_dot) {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(is_valid_domain_label)
}

fn is_atext_or_dot(c: char) -> bool {
    c.is_ascii_alphanumeric() || ".!#$%&'*+-/=?^_`{|}~".contains(c)
}

fn is_valid_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Decide whether a candidate email address may sign up.
///
/// Stage 1 rejects addresses that are not entirely lowercase, then addresses
/// that fail the syntax check. Stage 2 rejects addresses whose domain is on
/// the disposable list; admin calls skip stage 2 entirely. Pure over its
/// inputs, callers own all logging.
pub fn validate(
    email: &str,
    is_admin_call: bool,
    blacklist: &DisposableDomainSet,
) -> ValidationOutcome {
    if email.chars().any(char::is_uppercase) {
        return ValidationOutcome::Rejected(RejectionReason::NotLowercase);
    }

    if !is_valid_email_syntax(email) {
        return ValidationOutcome::Rejected(RejectionReason::SyntaxInvalid);
    }

    if is_admin_call {
        return ValidationOutcome::Allowed;
    }

    // rsplit keeps the full domain even if the local part contains an '@'
    // (it cannot after the syntax check, but stage 2 stands on its own).
    let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("");
    if blacklist.contains(domain) {
        return ValidationOutcome::Rejected(RejectionReason::DisposableDomain);
    }

    ValidationOutcome::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blacklist(domains: &[&str]) -> DisposableDomainSet {
        DisposableDomainSet::from_domains(domains.iter().copied())
    }

    #[test]
    fn test_uppercase_rejected_regardless_of_admin() {
        let set = blacklist(&["example.com"]);
        assert_eq!(
            validate("User@Example.com", false, &set),
            ValidationOutcome::Rejected(RejectionReason::NotLowercase)
        );
        assert_eq!(
            validate("User@Example.com", true, &set),
            ValidationOutcome::Rejected(RejectionReason::NotLowercase)
        );
        // Uppercase anywhere counts, not just the domain part
        assert_eq!(
            validate("uSer@example.com", false, &set),
            ValidationOutcome::Rejected(RejectionReason::NotLowercase)
        );
    }

    #[test]
    fn test_syntax_rejections() {
        let set = blacklist(&[]);
        for email in [
            "not-an-email",
            "",
            "user@",
            "@example.com",
            "user@nodot",
            "user@example..com",
            "user@-example.com",
            "us..er@example.com",
            ".user@example.com",
            "us er@example.com",
        ] {
            assert_eq!(
                validate(email, false, &set),
                ValidationOutcome::Rejected(RejectionReason::SyntaxInvalid),
                "expected syntax rejection for {:?}",
                email
            );
        }
    }

    #[test]
    fn test_common_addresses_accepted() {
        for email in [
            "user@example.com",
            "first.last@example.co.uk",
            "user+tag@example.com",
            "o'brien@example.com",
            "user_name@sub.example.com",
            "123@example.com",
        ] {
            assert!(is_valid_email_syntax(email), "expected valid: {:?}", email);
        }
    }

    #[test]
    fn test_disposable_domain_rejected() {
        assert_eq!(
            validate("user@example.com", false, &blacklist(&["example.com"])),
            ValidationOutcome::Rejected(RejectionReason::DisposableDomain)
        );
        assert_eq!(
            validate("user@example.com", false, &blacklist(&["mailinator.com"])),
            ValidationOutcome::Allowed
        );
    }

    #[test]
    fn test_admin_call_bypasses_domain_check() {
        assert_eq!(
            validate("user@mailinator.com", true, &blacklist(&["mailinator.com"])),
            ValidationOutcome::Allowed
        );
        assert_eq!(
            validate("user@mailinator.com", false, &blacklist(&["mailinator.com"])),
            ValidationOutcome::Rejected(RejectionReason::DisposableDomain)
        );
    }

    #[test]
    fn test_blacklist_membership_is_case_insensitive() {
        let set = blacklist(&["MAILINATOR.com"]);
        assert!(set.contains("mailinator.com"));
        assert!(set.contains("Mailinator.COM"));
        assert!(!set.contains("example.com"));
    }

    #[test]
    fn test_from_lines_trims_and_skips_blanks() {
        let set = DisposableDomainSet::from_lines("mailinator.com\n\n  yopmail.com  \n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("yopmail.com"));
    }

    #[test]
    fn test_bundled_list_loads() {
        let set = DisposableDomainSet::bundled();
        assert!(!set.is_empty());
        assert!(set.contains("mailinator.com"));
        assert!(!set.contains("gmail.com"));
    }
}
