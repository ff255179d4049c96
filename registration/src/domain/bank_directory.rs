//! Static catalogue of supported banks and their branches.
//!
//! The directory is built once and never mutated. Lookups are exact and
//! case-sensitive on the bank name; a miss is an absence, not an error.

use std::sync::OnceLock;

use serde::Serialize;

/// A single branch of a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Branch display name.
    pub name: &'static str,
    /// Branch-specific code.
    pub code: &'static str,
    /// City or area served.
    pub location: &'static str,
}

/// A bank with its universal (default) branch code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRecord {
    /// Bank name; the identity key.
    pub name: &'static str,
    /// Code assigned when the user selects the bank.
    pub default_branch_code: &'static str,
    /// Known branches.
    pub branches: Vec<Branch>,
}

impl BankRecord {
    /// Find a branch by its code.
    #[must_use]
    pub fn branch(&self, code: &str) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.code == code)
    }
}

/// Ordered, immutable bank catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDirectory {
    banks: Vec<BankRecord>,
}

static BUILT_IN: OnceLock<BankDirectory> = OnceLock::new();

impl BankDirectory {
    /// Build a directory from explicit records, preserving their order.
    #[must_use]
    pub const fn new(banks: Vec<BankRecord>) -> Self {
        Self { banks }
    }

    /// The shared built-in directory of South African banks.
    ///
    /// # Examples
    ///
    /// ```
    /// use registration::domain::BankDirectory;
    ///
    /// let fnb = BankDirectory::built_in().find_bank("FNB").expect("listed");
    /// assert_eq!(fnb.default_branch_code, "250655");
    /// ```
    pub fn built_in() -> &'static Self {
        BUILT_IN.get_or_init(|| Self::new(built_in_records()))
    }

    /// Every bank, in display order.
    #[must_use]
    pub fn list_banks(&self) -> &[BankRecord] {
        &self.banks
    }

    /// Look up a bank by exact name.
    #[must_use]
    pub fn find_bank(&self, name: &str) -> Option<&BankRecord> {
        self.banks.iter().find(|bank| bank.name == name)
    }
}

fn built_in_records() -> Vec<BankRecord> {
    vec![
        BankRecord {
            name: "ABSA",
            default_branch_code: "632005",
            branches: vec![
                Branch {
                    name: "Johannesburg Main",
                    code: "632005",
                    location: "Johannesburg",
                },
                Branch {
                    name: "Cape Town City",
                    code: "632005",
                    location: "Cape Town",
                },
                Branch {
                    name: "Durban Central",
                    code: "632005",
                    location: "Durban",
                },
            ],
        },
        BankRecord {
            name: "Capitec",
            default_branch_code: "470010",
            branches: vec![
                Branch {
                    name: "Stellenbosch Head Office",
                    code: "470010",
                    location: "Stellenbosch",
                },
                Branch {
                    name: "Sandton City",
                    code: "470010",
                    location: "Johannesburg",
                },
            ],
        },
        BankRecord {
            name: "FNB",
            default_branch_code: "250655",
            branches: vec![
                Branch {
                    name: "Bank City",
                    code: "250655",
                    location: "Johannesburg",
                },
                Branch {
                    name: "Adderley Street",
                    code: "201409",
                    location: "Cape Town",
                },
                Branch {
                    name: "Pretoria Central",
                    code: "251345",
                    location: "Pretoria",
                },
            ],
        },
        BankRecord {
            name: "Nedbank",
            default_branch_code: "198765",
            branches: vec![
                Branch {
                    name: "Sandton",
                    code: "198765",
                    location: "Johannesburg",
                },
                Branch {
                    name: "Durban Main",
                    code: "130426",
                    location: "Durban",
                },
            ],
        },
        BankRecord {
            name: "Standard Bank",
            default_branch_code: "051001",
            branches: vec![
                Branch {
                    name: "Simmonds Street",
                    code: "051001",
                    location: "Johannesburg",
                },
                Branch {
                    name: "Thibault Square",
                    code: "020909",
                    location: "Cape Town",
                },
                Branch {
                    name: "Port Elizabeth",
                    code: "050017",
                    location: "Gqeberha",
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ABSA", "632005")]
    #[case("Capitec", "470010")]
    #[case("FNB", "250655")]
    #[case("Nedbank", "198765")]
    #[case("Standard Bank", "051001")]
    fn built_in_defaults(#[case] name: &str, #[case] code: &str) {
        let bank = BankDirectory::built_in().find_bank(name).expect("listed bank");
        assert_eq!(bank.default_branch_code, code);
        assert!(bank.branch(code).is_some(), "default code names a branch");
    }

    #[rstest]
    fn lookup_is_exact() {
        let directory = BankDirectory::built_in();
        assert!(directory.find_bank("standard bank").is_none());
        assert!(directory.find_bank("NonexistentBank").is_none());
    }

    #[rstest]
    fn listing_preserves_order() {
        let names: Vec<_> = BankDirectory::built_in()
            .list_banks()
            .iter()
            .map(|bank| bank.name)
            .collect();
        assert_eq!(names, ["ABSA", "Capitec", "FNB", "Nedbank", "Standard Bank"]);
    }
}
