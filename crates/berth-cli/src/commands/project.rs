//! Loading a config and turning CLI arguments into a plan.

use std::path::{Path, PathBuf};

use berth_common::constants::{APP_NAME, CONFIG_FILE_NAMES, find_config_file};
use berth_common::error::{BerthError, Result};
use berth_compose::config::ComposeConfig;
use berth_compose::graph::DependencyGraph;
use berth_compose::target::{AllowList, ResolutionContext, Target};
use berth_compose::unit_of_work::UnitOfWork;

use super::{Cli, TargetArgs};

/// A loaded config together with its dependency graph.
#[derive(Debug)]
pub struct Project {
    /// Path the config was loaded from.
    pub path: PathBuf,
    /// Parsed config.
    pub config: ComposeConfig,
    /// Graph built from `config`.
    pub graph: DependencyGraph,
}

impl Project {
    /// Loads `path`, or the first config file found in the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file is found or it fails to load.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => discover()?,
        };
        let config = ComposeConfig::load(&path)?;
        let graph = DependencyGraph::from_config(&config);
        Ok(Self {
            path,
            config,
            graph,
        })
    }

    /// Builds the allow-list from the global `--only`/`--exclude` filters.
    pub fn allow_list(&self, cli: &Cli) -> AllowList {
        AllowList::from_filters(&self.config.container_names(), &cli.only, &cli.exclude)
    }

    /// Resolves the target named by `args`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is unknown.
    pub fn target(&self, cli: &Cli, args: &TargetArgs) -> Result<Target> {
        let allow_list = self.allow_list(cli);
        let context = ResolutionContext {
            graph: &self.graph,
            groups: &self.config.groups,
            allow_list: &allow_list,
            cascade: args.cascade(),
        };
        Target::resolve(&context, args.reference())
    }

    /// Resolves the target and plans its unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved or planned.
    pub fn unit_of_work(&self, cli: &Cli, args: &TargetArgs) -> Result<(Target, UnitOfWork)> {
        let target = self.target(cli, args)?;
        let unit = UnitOfWork::new(&self.graph, &target.all())?;
        Ok((target, unit))
    }
}

fn discover() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| BerthError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    find_config_file(&cwd).ok_or_else(|| BerthError::Config {
        message: format!(
            "no {APP_NAME} config file found in {}; pass --config or create one of: {}",
            cwd.display(),
            CONFIG_FILE_NAMES.join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::commands::Command;

    const STACK: &str = "containers:\n  web:\n    link: [db]\n  db:\n    volumes-from: [data]\n  data: {}\n  cache: {}\n";

    fn project() -> (tempfile::TempDir, Project) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("berth.yml");
        std::fs::write(&path, STACK).expect("write");
        let project = Project::load(Some(&path)).expect("should load");
        (dir, project)
    }

    #[test]
    fn unit_of_work_honours_filters_and_cascade() {
        let (_dir, project) = project();
        let cli = Cli::try_parse_from(["berth", "run", "-e", "--only", "web"]).expect("parse");
        let Command::Run(args) = &cli.command else {
            panic!("expected run");
        };
        let (target, unit) = project.unit_of_work(&cli, args).expect("should plan");
        assert_eq!(target.initial(), ["web"]);
        assert_eq!(target.dependencies(), ["data", "db"]);
        assert_eq!(unit.containers(), vec!["data", "db", "web"]);
        assert_eq!(unit.targeted(), vec!["data", "db", "web"]);
    }

    #[test]
    fn exclude_filter_without_cascade_keeps_required_closure() {
        let (_dir, project) = project();
        let cli = Cli::try_parse_from(["berth", "run", "--exclude", "cache,data"]).expect("parse");
        let Command::Run(args) = &cli.command else {
            panic!("expected run");
        };
        let (target, unit) = project.unit_of_work(&cli, args).expect("should plan");
        assert_eq!(target.all(), vec!["db", "web"]);
        assert!(target.dependencies().is_empty());
        assert_eq!(unit.containers(), vec!["data", "db", "web"]);
        assert_eq!(unit.targeted(), vec!["db", "web"]);
    }

    #[test]
    fn unknown_target_fails() {
        let (_dir, project) = project();
        let cli = Cli::try_parse_from(["berth", "start", "api"]).expect("parse");
        let Command::Start(args) = &cli.command else {
            panic!("expected start");
        };
        assert!(project.target(&cli, args).is_err());
    }
}
