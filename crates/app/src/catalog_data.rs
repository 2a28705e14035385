//! Built-in skill catalog.
//!
//! Entries are grouped contiguously by domain, which the catalog loader
//! validates and the break interstitials depend on.

use assess_core::model::{SkillEntry, SkillLevel};

const INFRA: &str = "Infrastructure Engineer";
const DEV: &str = "Application Developer";

fn entry(domain: &str, item: &str, level: SkillLevel, name: &str) -> SkillEntry {
    SkillEntry::new(domain, item, level, name)
}

/// The full built-in catalog, in assessment order.
#[must_use]
pub fn entries() -> Vec<SkillEntry> {
    use SkillLevel::{Advanced, Beginner, Intermediate};

    vec![
        // Infrastructure Engineer / Server
        entry(INFRA, "Server", Beginner, "Basic server setup and management"),
        entry(INFRA, "Server", Beginner, "Basic monitoring"),
        entry(INFRA, "Server", Beginner, "OS installation"),
        entry(INFRA, "Server", Beginner, "Entry-level troubleshooting"),
        entry(INFRA, "Server", Intermediate, "High-availability design"),
        entry(INFRA, "Server", Intermediate, "Performance tuning"),
        entry(INFRA, "Server", Intermediate, "Server resource management"),
        entry(INFRA, "Server", Intermediate, "Intermediate Linux administration"),
        entry(INFRA, "Server", Advanced, "End-to-end infrastructure design"),
        entry(INFRA, "Server", Advanced, "Disaster recovery and BCP planning"),
        entry(INFRA, "Server", Advanced, "Large-scale system design"),
        entry(INFRA, "Server", Advanced, "On-premises to cloud integration design"),
        // Infrastructure Engineer / Cloud
        entry(INFRA, "Cloud", Beginner, "AWS/Azure/GCP console basics"),
        entry(INFRA, "Cloud", Beginner, "Creating and removing cloud resources"),
        entry(INFRA, "Cloud", Beginner, "Using basic managed services"),
        entry(INFRA, "Cloud", Beginner, "Virtual machine management"),
        entry(INFRA, "Cloud", Intermediate, "Infrastructure as code (Terraform)"),
        entry(INFRA, "Cloud", Intermediate, "Container technology (Docker/Kubernetes)"),
        entry(INFRA, "Cloud", Intermediate, "Cloud cost optimization"),
        entry(INFRA, "Cloud", Intermediate, "Cloud monitoring and security hardening"),
        entry(INFRA, "Cloud", Advanced, "Multi-cloud design"),
        entry(INFRA, "Cloud", Advanced, "Cloud-native architecture"),
        entry(INFRA, "Cloud", Advanced, "Cloud migration planning"),
        entry(INFRA, "Cloud", Advanced, "Serverless architecture"),
        // Infrastructure Engineer / Network
        entry(INFRA, "Network", Beginner, "Router and switch configuration"),
        entry(INFRA, "Network", Beginner, "Network troubleshooting"),
        entry(INFRA, "Network", Beginner, "IP addressing and subnet design"),
        entry(INFRA, "Network", Beginner, "Basic VPN setup"),
        entry(INFRA, "Network", Intermediate, "Network security design"),
        entry(INFRA, "Network", Intermediate, "Load balancing design"),
        entry(INFRA, "Network", Intermediate, "SD-WAN rollout and operation"),
        entry(INFRA, "Network", Intermediate, "VLAN and virtual network design"),
        entry(INFRA, "Network", Advanced, "Large-scale network design"),
        entry(INFRA, "Network", Advanced, "Global network design"),
        entry(INFRA, "Network", Advanced, "Cross-cloud network integration"),
        entry(INFRA, "Network", Advanced, "Next-generation network architecture"),
        // Application Developer / Programming
        entry(DEV, "Programming", Beginner, "Basic coding in one or two languages"),
        entry(DEV, "Programming", Beginner, "Basic algorithm knowledge"),
        entry(DEV, "Programming", Beginner, "Bug fixing and refactoring"),
        entry(DEV, "Programming", Beginner, "Responding to code review"),
        entry(DEV, "Programming", Intermediate, "Coding in multiple languages"),
        entry(DEV, "Programming", Intermediate, "Implementing design patterns"),
        entry(DEV, "Programming", Intermediate, "Performance improvement"),
        entry(DEV, "Programming", Intermediate, "Using libraries and frameworks"),
        entry(DEV, "Programming", Advanced, "Technology selection and evaluation"),
        entry(DEV, "Programming", Advanced, "Defining development standards"),
        entry(DEV, "Programming", Advanced, "Coding mentorship and review"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::catalog::Catalog;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::from_entries(entries()).unwrap();
        assert_eq!(catalog.len(), 47);
        assert_eq!(catalog.domains(), vec![INFRA.to_owned(), DEV.to_owned()]);
    }
}
