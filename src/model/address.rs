//! Sender parsing for the free-text `From`/`sender` field.

/// A sender split into its display name and mailbox address.
///
/// # Examples
/// - `"Jane Doe <jane.doe@x.com>"` → `display_name = "Jane Doe"`, `address = "jane.doe@x.com"`
/// - `"jane.doe@x.com"` → `display_name = ""`, `address = "jane.doe@x.com"`
/// - `"Support Desk"` → `display_name = "Support Desk"`, `address = ""`
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sender {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare address (`user@domain`), empty when the field has no `@`.
    pub address: String,
}

impl Sender {
    /// Parse a sender field.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Name, Quoted\" <user@domain.com>"`
    ///
    /// Text without an `@` is kept as the display name.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    display_name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }

        if trimmed.contains('@') {
            Self {
                display_name: String::new(),
                address: trimmed.to_string(),
            }
        } else {
            Self {
                display_name: strip_quotes(trimmed),
                address: String::new(),
            }
        }
    }

    /// The part of the address before the first `@`, if the sender has one.
    pub fn local_part(&self) -> Option<&str> {
        let (local, _domain) = self.address.split_once('@')?;
        Some(local.trim())
    }

    /// Guess a human name from the address local part.
    ///
    /// `jane.doe` and `jane_doe` both become `"Jane Doe"`.
    pub fn name_from_local_part(&self) -> Option<String> {
        self.local_part().map(name_from_local_part)
    }

    /// Format for display: `"Display Name <address>"` or whichever half is present.
    pub fn display(&self) -> String {
        match (self.display_name.is_empty(), self.address.is_empty()) {
            (false, false) => format!("{} <{}>", self.display_name, self.address),
            (true, _) => self.address.clone(),
            (false, true) => self.display_name.clone(),
        }
    }
}

/// `jane.doe` / `jane_doe` → `"Jane Doe"`.
pub fn name_from_local_part(local: &str) -> String {
    title_case(&local.trim().replace(['.', '_'], " "))
}

/// Title-case a string: a letter is uppercased when it follows a non-letter
/// and lowercased otherwise (`"o'neil mc2x"` → `"O'Neil Mc2X"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
