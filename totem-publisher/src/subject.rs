use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Kind of artifact a test subject identifies.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Ip,
    Domain,
    File,
}

const IP_TASKS: &[&str] = &["ASNMETA"];
const DOMAIN_TASKS: &[&str] = &["DNSMETA"];
const FILE_TASKS: &[&str] = &["GOGADGET", "OBJDUMP", "PEID", "PEINFO", "VIRUSTOTAL", "YARA"];

impl SubjectKind {
    /// Names of the services a subject of this kind is sent to.
    pub fn tasks(self) -> &'static [&'static str] {
        match self {
            SubjectKind::Ip => IP_TASKS,
            SubjectKind::Domain => DOMAIN_TASKS,
            SubjectKind::File => FILE_TASKS,
        }
    }

    /// Only files have a sample which has to be downloaded before analysis.
    pub fn download(self) -> bool {
        self == SubjectKind::File
    }
}

#[derive(Clone, Constructor, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// IP address, domain name or SHA-256 of a sample.
    pub identifier: String,
    pub kind: SubjectKind,
}

const DEFAULT_IP: &str = "8.8.8.8";
const DEFAULT_DOMAIN: &str = "google.com";
const DEFAULT_SAMPLES: [&str; 10] = [
    "0a4efbe854f1fa444303ca210842e779b55570216f62a4a406c89c564dabaf97",
    "2a43108a60fc5db94a001117093b6fff95697a8a5ab9a836b3c33c733c374c29",
    "4b3287ef7e1b6add22621dcc97984e7aa12ca8ebb4625fc5eb36c9e707e4eb5f",
    "6fc9eb27fb82ead3a45a0fcee147eae01e12b9b36f587ac3e965d34b2ab59528",
    "7b365fe20f882ecce7096e56366df43c7e84f221902216c70b9ec3e2e68698e0",
    "973cfe3c16d97b37b044517531c43f87fe5e50dfb5726f59452040af1b724ee8",
    "c24bfff732cb7cf7d52c38dc92e3621aca781252157ab37093efba561579719d",
    "d2b41f09c3d48f808c5677331baa667ecf2f8b747517a993920c59dd14cbc695",
    "f8d3414d805dc45a2f50e7e933a450acbcb3416017358281a2a860d6cbea015c",
    "fa572834b690927a7a0eaffaac96f8de3aa1a5efd9dda585f0637d63db4b105f",
];

/// Built-in test subjects: one IP, one domain, then the sample hashes.
pub fn default_subjects() -> Vec<Subject> {
    [
        Subject::new(DEFAULT_IP.into(), SubjectKind::Ip),
        Subject::new(DEFAULT_DOMAIN.into(), SubjectKind::Domain),
    ]
    .into_iter()
    .chain(
        DEFAULT_SAMPLES
            .iter()
            .map(|sample| Subject::new(sample.to_string(), SubjectKind::File)),
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_kind_to_tasks() {
        assert_eq!(SubjectKind::Ip.tasks(), ["ASNMETA"]);
        assert_eq!(SubjectKind::Domain.tasks(), ["DNSMETA"]);
        assert_eq!(
            SubjectKind::File.tasks(),
            ["GOGADGET", "OBJDUMP", "PEID", "PEINFO", "VIRUSTOTAL", "YARA"]
        );
    }

    #[test]
    fn should_download_files_only() {
        assert!(!SubjectKind::Ip.download());
        assert!(!SubjectKind::Domain.download());
        assert!(SubjectKind::File.download());
    }

    #[test]
    fn should_list_default_subjects_in_order() {
        let subjects = default_subjects();

        assert_eq!(subjects.len(), 12);
        assert_eq!(subjects[0], Subject::new("8.8.8.8".into(), SubjectKind::Ip));
        assert_eq!(
            subjects[1],
            Subject::new("google.com".into(), SubjectKind::Domain)
        );
        assert!(subjects[2..]
            .iter()
            .all(|subject| subject.kind == SubjectKind::File && subject.identifier.len() == 64));
    }
}
