//! CLI entry point: loads one CSV file into an in-memory table and runs a
//! fixed demonstration plan (project every column) through the runner,
//! printing chunks column-aligned to stdout. There is no SQL parser in this
//! core, so the plan shape is built in-process rather than read from a query
//! file; `--query-id` only labels the run in logs and in the result file
//! name.

use clap::Parser;
use prism::catalog::{MemoryCatalog, MemoryTable, TableSchema, TableStats};
use prism::config::Config;
use prism::execution::context::ExecutionContext;
use prism::execution::operators::Runner;
use prism::expression::expression::Expression;
use prism::planner::physical_plan::{PhysicalOperator, ProjectOperator, ScanOperator};
use prism::types::{DataChunk, LogicalType, Value};
use prism::PrismDBResult;
use std::process;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "prism", about = "Vectorized pull-based SQL execution core")]
struct Cli {
    #[arg(long, default_value = "")]
    ddl: String,

    #[arg(long, default_value = "demo")]
    query_id: String,

    #[arg(long)]
    data: String,

    #[arg(long, default_value = "")]
    result: String,

    #[arg(long)]
    print_plan: bool,

    #[arg(long)]
    count: bool,

    #[arg(long)]
    max_scan_rows: Option<usize>,
}

fn load_csv_table(path: &str) -> PrismDBResult<MemoryTable> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| prism::PrismDBError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string())))?;
    let headers: Vec<String> = reader.headers().map_err(|e| prism::PrismDBError::Parse(e.to_string()))?.iter().map(String::from).collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| prism::PrismDBError::Parse(e.to_string()))?;
        for (i, field) in record.iter().enumerate() {
            columns[i].push(Value::varchar(field.to_string()));
        }
    }

    Ok(MemoryTable {
        schema: TableSchema {
            columns: headers.clone(),
            types: vec![LogicalType::Varchar; headers.len()],
            primary_key: vec![],
            stats: TableStats {
                row_count: columns.first().map(|c| c.len()).unwrap_or(0),
            },
        },
        columns,
    })
}

fn print_chunk(chunk: &DataChunk) {
    for row in 0..chunk.count() {
        let fields: Vec<String> = (0..chunk.column_count())
            .map(|col| match chunk.get_value(row, col) {
                Ok(Value::Null) => String::new(),
                Ok(v) => v.to_string(),
                Err(_) => String::new(),
            })
            .collect();
        println!("{}", fields.join("\t"));
    }
}

fn run(cli: Cli) -> PrismDBResult<()> {
    let table = load_csv_table(&cli.data)?;
    let column_count = table.schema.columns.len();
    let types = table.schema.types.clone();

    let mut catalog = MemoryCatalog::new();
    catalog.add_table("default", "input", table);
    let reader = catalog.open("default", "input", &[])?;

    let scan = ScanOperator::new(reader, types.clone(), None);
    let projections: Vec<Expression> = (0..column_count)
        .map(|i| Expression::column(i, types[i].clone()))
        .collect();
    let mut plan = PhysicalOperator::Project(ProjectOperator::new(PhysicalOperator::Scan(scan), projections));

    if cli.print_plan {
        info!("plan: scan(default.input) -> project({} columns)", column_count);
    }

    let mut config = Config::for_query(&cli.ddl, "", &cli.query_id, &cli.data);
    config.tpch1g.result.path = cli.result.clone();
    config.debug.print_plan = cli.print_plan;
    config.debug.count = cli.count;
    if let Some(max) = cli.max_scan_rows {
        config.debug.enable_max_scan_rows = true;
        config.debug.max_scan_rows = max;
    }

    let ctx = ExecutionContext::new(config);
    let mut runner = Runner::new(&ctx);
    let mut total_rows = 0usize;
    runner.run(&mut plan, |chunk| {
        total_rows += chunk.count();
        if !cli.count {
            print_chunk(chunk);
        }
        Ok(())
    })?;

    if cli.count {
        println!("{}", total_rows);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
