use std::net::SocketAddr;
use std::path::PathBuf;

use cas_object::{ObjectId, ObjectType};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cas",
    about = "Content-addressed git object storage and backend benchmarks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Storage backend for object commands
    #[arg(long, global = true, default_value = "redb")]
    pub backend: BackendKind,

    /// Directory holding the local database files
    #[arg(long, global = true, default_value = ".cas")]
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// Process-local map; nothing survives the command
    Memory,
    Redb,
    Sqlite,
    /// S3-compatible bucket configured through MINIO_* variables
    S3,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute an object's address without storing it
    HashObject(HashObjectArgs),
    /// Store a file as an object and print its address
    Put(PutArgs),
    /// Print a stored object's contents
    CatFile(CatFileArgs),
    /// Check whether an object is stored
    Exists(ExistsArgs),
    /// Benchmark every backend and print the report
    Bench(BenchArgs),
    /// Start the benchmark HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct HashObjectArgs {
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectType,
    /// File to read, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Args)]
pub struct PutArgs {
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectType,
    /// File to read, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Print the object type instead of its contents
    #[arg(short = 't')]
    pub type_only: bool,
    pub id: ObjectId,
}

#[derive(Args)]
pub struct ExistsArgs {
    pub id: ObjectId,
}

#[derive(Args)]
pub struct BenchArgs {
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Parent directory for temporary databases (defaults to the system temp dir)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
