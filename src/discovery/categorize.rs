//! Tool Categorizer
//!
//! Buckets a discovered tool into a fixed category from keyword heuristics
//! over its name and harvested help text. The table below is an ordered
//! precedence: the first category with any substring hit wins, and the
//! ordering is preserved for compatibility rather than as a semantic
//! ranking. A tool matching nothing lands in `general`.

use serde::{Deserialize, Serialize};

/// Fixed tool categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    Reconnaissance,
    Vulnerability,
    Fuzzing,
    C2,
    Maldev,
    ActiveDirectory,
    Credential,
    General,
}

impl ToolCategory {
    /// Protocol-facing category name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reconnaissance => "reconnaissance",
            Self::Vulnerability => "vulnerability",
            Self::Fuzzing => "fuzzing",
            Self::C2 => "c2",
            Self::Maldev => "maldev",
            Self::ActiveDirectory => "active-directory",
            Self::Credential => "credential",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(category, keywords)` precedence table
const CATEGORY_KEYWORDS: &[(ToolCategory, &[&str])] = &[
    (
        ToolCategory::Reconnaissance,
        &[
            "recon", "scan", "nmap", "enum", "subdomain", "dns", "osint", "discover", "probe",
            "fingerprint",
        ],
    ),
    (
        ToolCategory::Vulnerability,
        &["vuln", "cve", "exploit", "injection", "sqlmap", "xss", "nuclei"],
    ),
    (
        ToolCategory::Fuzzing,
        &["fuzz", "wordlist", "brute", "dirbust", "gobuster", "ffuf"],
    ),
    (
        ToolCategory::C2,
        &["c2", "command and control", "implant", "beacon", "listener", "stager"],
    ),
    (
        ToolCategory::Maldev,
        &[
            "shellcode",
            "malware",
            "obfuscat",
            "evasion",
            "disassemb",
            "decompil",
            "reverse engineer",
            "binary analysis",
        ],
    ),
    (
        ToolCategory::ActiveDirectory,
        &["active directory", "kerberos", "ldap", "ntlm", "domain controller", "bloodhound"],
    ),
    (
        ToolCategory::Credential,
        &["password", "credential", "hash crack", "hashcat", "login", "spray"],
    ),
];

/// Categorize a tool from its name and help text
///
/// Pure function: the same `(name, help_text)` always yields the same
/// category.
pub fn categorize(name: &str, help_text: &str) -> ToolCategory {
    let haystack = format!("{} {}", name, help_text).to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *category;
        }
    }
    ToolCategory::General
}

/// All category names in precedence order, `general` last
pub fn all_categories() -> Vec<&'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, _)| category.as_str())
        .chain(std::iter::once(ToolCategory::General.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_buckets() {
        assert_eq!(categorize("nmap_scan", "network scanner"), ToolCategory::Reconnaissance);
        assert_eq!(categorize("cvemap", "finds cve matches"), ToolCategory::Vulnerability);
        assert_eq!(categorize("ffuf", "web fuzzer"), ToolCategory::Fuzzing);
        assert_eq!(categorize("sliver", "implant generation and listener"), ToolCategory::C2);
        assert_eq!(categorize("donut", "shellcode loader"), ToolCategory::Maldev);
        assert_eq!(
            categorize("ldapsearch", "query ldap directory objects"),
            ToolCategory::ActiveDirectory
        );
        assert_eq!(categorize("hydra", "password spraying"), ToolCategory::Credential);
    }

    #[test]
    fn test_unmatched_falls_back_to_general() {
        assert_eq!(categorize("mystery", "does something"), ToolCategory::General);
    }

    #[test]
    fn test_first_match_precedence() {
        // Matches both reconnaissance ("scan") and vulnerability ("vuln");
        // the earlier table entry wins.
        assert_eq!(
            categorize("scanner", "scan for vulns"),
            ToolCategory::Reconnaissance
        );
    }

    #[test]
    fn test_pure_function() {
        let a = categorize("kerbrute", "kerberos bruteforcing");
        let b = categorize("kerbrute", "kerberos bruteforcing");
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize("NMAP", "Network SCANNER"), ToolCategory::Reconnaissance);
    }

    #[test]
    fn test_all_categories_listing() {
        let all = all_categories();
        assert_eq!(all.len(), 8);
        assert_eq!(all.first(), Some(&"reconnaissance"));
        assert_eq!(all.last(), Some(&"general"));
    }

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ToolCategory::ActiveDirectory).unwrap(),
            "\"active-directory\""
        );
    }
}
