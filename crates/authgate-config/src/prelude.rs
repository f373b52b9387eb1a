pub use crate::{
    errors::ConfigError,
    loader::Loader,
    model::{Checksum, ConfigMap, KeyPath, Layer, ProvenanceEntry, SnapshotVersion},
    snapshot::ConfigSnapshot,
    source::{cli::CliArgsSource, env::EnvSource, file::FileSource, Source, SourceSnapshot},
    validate::{BasicValidator, Validator},
};
