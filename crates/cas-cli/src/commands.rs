use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use cas_bench::{BenchConfig, BenchSuite, OperationResult, RunResult};
use cas_object::{codec, Object, ObjectId, ObjectType};
use cas_server::{CasServer, ServerConfig};
use cas_store::{
    InMemoryObjectStore, ObjectStore, RedbObjectStore, S3Config, S3ObjectStore,
    SqliteObjectStore,
};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        backend,
        path,
        ..
    } = cli;
    match command {
        Command::HashObject(args) => cmd_hash_object(args, format),
        Command::Put(args) => cmd_put(open_store(backend, &path)?.as_ref(), args, format),
        Command::CatFile(args) => cmd_cat_file(open_store(backend, &path)?.as_ref(), args, format),
        Command::Exists(args) => cmd_exists(open_store(backend, &path)?.as_ref(), args, format),
        Command::Bench(args) => cmd_bench(args, format),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn open_store(kind: BackendKind, dir: &Path) -> anyhow::Result<Box<dyn ObjectStore>> {
    let store: Box<dyn ObjectStore> = match kind {
        BackendKind::Memory => Box::new(InMemoryObjectStore::new()),
        BackendKind::Redb => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            Box::new(RedbObjectStore::open(dir.join("objects.redb"))?)
        }
        BackendKind::Sqlite => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            Box::new(SqliteObjectStore::open(dir.join("objects.db"))?)
        }
        BackendKind::S3 => {
            let config = S3Config::from_env()
                .context("the s3 backend needs MINIO_ENDPOINT (or ENDPOINT) to be set")?;
            Box::new(S3ObjectStore::connect(&config)?)
        }
    };
    Ok(store)
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("reading stdin")?;
        return Ok(data);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn print_id(id: &ObjectId, kind: ObjectType, size: usize, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => println!(
            "{}",
            json!({ "id": id.to_hex(), "type": kind, "size": size })
        ),
    }
}

fn cmd_hash_object(args: HashObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data = read_input(&args.file)?;
    let id = codec::hash_object(args.kind, &data);
    print_id(&id, args.kind, data.len(), format);
    Ok(())
}

fn put_file(store: &dyn ObjectStore, kind: ObjectType, file: &Path) -> anyhow::Result<Object> {
    let object = Object::new(kind, read_input(file)?);
    store
        .put(&object)
        .with_context(|| format!("storing {} in {}", file.display(), store.name()))?;
    Ok(object)
}

fn cmd_put(store: &dyn ObjectStore, args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let object = put_file(store, args.kind, &args.file)?;
    print_id(&object.id(), object.kind, object.size(), format);
    Ok(())
}

fn cmd_cat_file(
    store: &dyn ObjectStore,
    args: CatFileArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = store.get(&args.id)?;
    match (format, args.type_only) {
        (OutputFormat::Json, _) => println!(
            "{}",
            json!({ "id": args.id.to_hex(), "type": object.kind, "size": object.size() })
        ),
        (OutputFormat::Text, true) => println!("{}", object.kind),
        (OutputFormat::Text, false) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&object.data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_exists(
    store: &dyn ObjectStore,
    args: ExistsArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let present = store.exists(&args.id)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "id": args.id.to_hex(), "exists": present })),
        OutputFormat::Text if present => println!("{} {}", "✓".green().bold(), args.id),
        OutputFormat::Text => println!("{} {} not found", "✗".red().bold(), args.id),
    }
    Ok(())
}

fn bench_suite(args: &BenchArgs) -> BenchSuite {
    let mut config = BenchConfig::default();
    if let Some(iterations) = args.iterations {
        config = config.with_iterations(iterations);
    }
    let work_dir = args.work_dir.clone().unwrap_or_else(std::env::temp_dir);
    BenchSuite::new(work_dir)
        .with_config(config)
        .with_s3(S3Config::from_env())
}

fn cmd_bench(args: BenchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let run = bench_suite(&args).run();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Text => print_report(&run),
    }
    Ok(())
}

fn fmt_op(op: &OperationResult) -> String {
    format!(
        "p50 {:>9.1?}  p99 {:>9.1?}  {:>10.1} ops/s",
        op.p50, op.p99, op.ops_per_sec
    )
}

fn print_report(run: &RunResult) {
    println!("Benchmark run at {}", run.timestamp.to_rfc3339().bold());
    for backend in &run.backends {
        println!("\n{}", backend.name.cyan().bold());
        if let Some(error) = &backend.error {
            println!("  {} {}", "✗".red().bold(), error.red());
            continue;
        }
        for size in &backend.sizes {
            println!("  {}", size.size_label.yellow());
            println!("    {:<14} {}", "Put", fmt_op(&size.put));
            println!("    {:<14} {}", "Get", fmt_op(&size.get));
            println!("    {:<14} {}", "Exists", fmt_op(&size.exists));
            println!("    {:<14} {}", "ConcurrentPut", fmt_op(&size.concurrent_put));
        }
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!(
        "cas server on {} (data: {})",
        config.bind_addr.to_string().bold(),
        config.data_dir.display()
    );
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(CasServer::new(config).serve())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("input");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn put_then_get_on_each_local_backend() {
        for kind in [BackendKind::Memory, BackendKind::Redb, BackendKind::Sqlite] {
            let dir = tempfile::tempdir().unwrap();
            let file = write_file(&dir, b"hello\n");
            let store = open_store(kind, &dir.path().join("db")).unwrap();

            let object = put_file(store.as_ref(), ObjectType::Blob, &file).unwrap();
            assert_eq!(object.id().to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
            assert!(store.exists(&object.id()).unwrap());
            assert_eq!(store.get(&object.id()).unwrap(), object);
        }
    }

    #[test]
    fn local_backends_persist_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, b"persist me");
        let db = dir.path().join("db");
        let id = {
            let store = open_store(BackendKind::Sqlite, &db).unwrap();
            put_file(store.as_ref(), ObjectType::Commit, &file).unwrap().id()
        };
        let store = open_store(BackendKind::Sqlite, &db).unwrap();
        assert_eq!(store.get(&id).unwrap().kind, ObjectType::Commit);
    }

    #[test]
    fn missing_input_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }

    #[test]
    fn bench_suite_uses_flags() {
        let args = BenchArgs {
            iterations: Some(3),
            work_dir: Some("/var/tmp".into()),
        };
        assert_eq!(bench_suite(&args).config().iterations, 3);
    }

    #[test]
    fn operation_line_formats() {
        let line = fmt_op(&OperationResult {
            p50: std::time::Duration::from_micros(120),
            p99: std::time::Duration::from_micros(900),
            ops_per_sec: 4321.0,
        });
        assert!(line.contains("ops/s"));
        assert!(line.contains("4321.0"));
    }
}
