use std::path::Path;

use walkdir::WalkDir;

use crate::pipeline::{OutputFields, PathResolver};

/// The logical address of an output, all versions included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputQuery {
    pub project: String,
    pub shot: String,
    pub step: String,
    pub output_type: String,
    pub output_name: String,
}

impl OutputQuery {
    pub fn new(
        project: impl Into<String>,
        shot: impl Into<String>,
        step: impl Into<String>,
        output_type: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            shot: shot.into(),
            step: step.into(),
            output_type: output_type.into(),
            output_name: output_name.into(),
        }
    }

    pub fn matches(&self, fields: &OutputFields) -> bool {
        self.project == fields.project
            && self.shot == fields.shot
            && self.step == fields.step
            && self.output_type == fields.output_type
            && self.output_name == fields.output_name
    }

    pub fn with_version(&self, version: u32) -> OutputFields {
        OutputFields::new(
            self.project.clone(),
            self.shot.clone(),
            self.step.clone(),
            self.output_type.clone(),
            self.output_name.clone(),
            version,
        )
    }
}

/// Find existing versions of an output on disk, ascending by version.
///
/// Walks the search root and keeps the directories the resolver parses back
/// to the queried output.
pub fn find_versions(
    resolver: &impl PathResolver,
    search_root: &Path,
    query: &OutputQuery,
) -> Vec<OutputFields> {
    let mut versions: Vec<OutputFields> = WalkDir::new(search_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| resolver.parse(entry.path()).ok())
        .filter(|fields| query.matches(fields))
        .collect();
    versions.sort_by_key(|fields| fields.version);
    versions.dedup();
    versions
}

/// The highest existing version of an output, if any.
pub fn find_latest(
    resolver: &impl PathResolver,
    search_root: &Path,
    query: &OutputQuery,
) -> Option<OutputFields> {
    find_versions(resolver, search_root, query).pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use crate::pipeline::TemplateResolver;

    /// A throwaway on-disk project layout, removed on drop.
    struct TempJobs {
        root: PathBuf,
    }

    impl TempJobs {
        fn new(tag: &str) -> Self {
            let root = std::env::temp_dir().join(format!("rigkit-{}-{tag}", std::process::id()));
            if root.exists() {
                fs::remove_dir_all(&root).unwrap();
            }
            fs::create_dir_all(&root).unwrap();
            Self { root }
        }
    }

    impl Drop for TempJobs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    fn query() -> OutputQuery {
        OutputQuery::new("totoro", "sh0120", "animation", "cache", "hero_body")
    }

    #[test]
    fn versions_are_discovered_in_order() {
        let jobs = TempJobs::new("versions");
        let resolver = TemplateResolver::new(&jobs.root);

        for version in [5, 1, 2] {
            let path = resolver.resolve(&query().with_version(version)).unwrap();
            fs::create_dir_all(path).unwrap();
        }
        // Noise the template does not match.
        fs::create_dir_all(jobs.root.join("totoro/sequences/sh0120/animation/output/notes")).unwrap();

        let versions = find_versions(&resolver, &jobs.root, &query());
        assert_eq!(
            versions.iter().map(|f| f.version).collect::<Vec<_>>(),
            vec![1, 2, 5],
        );

        let latest = find_latest(&resolver, &jobs.root, &query()).unwrap();
        assert_eq!(latest.version, 5);
    }

    #[test]
    fn other_outputs_do_not_leak_into_the_query() {
        let jobs = TempJobs::new("leak");
        let resolver = TemplateResolver::new(&jobs.root);

        let other = OutputFields::new("totoro", "sh0120", "animation", "cache", "hero_cloth", 9);
        fs::create_dir_all(resolver.resolve(&other).unwrap()).unwrap();

        assert!(find_versions(&resolver, &jobs.root, &query()).is_empty());
        assert!(find_latest(&resolver, &jobs.root, &query()).is_none());
    }
}
