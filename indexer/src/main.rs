use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use invindex::{build_inverted_index, load_documents, CodecKind, InvertedIndex};
use regex::Regex;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "inverted-index")]
#[command(about = "Build, dump, load and query an inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a document file and dump it to disk
    Build {
        /// Document file, one `<id> <words...>` line per document
        #[arg(short = 'd', long)]
        dataset: PathBuf,
        /// Where to store the index
        #[arg(short = 'o', long)]
        output: PathBuf,
        /// Storage codec: json, array, wide-array or bincode
        #[arg(long, default_value_t = CodecKind::Array)]
        codec: CodecKind,
    },
    /// Run conjunctive queries against a dumped index
    Query {
        /// Path to the dumped index
        #[arg(short = 'i', long)]
        index: PathBuf,
        /// Codec the index was dumped with
        #[arg(long, default_value_t = CodecKind::Array)]
        codec: CodecKind,
        /// Words of a single query
        #[arg(long, num_args = 1.., value_name = "WORD", conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Vec<String>,
        /// File with one query per line
        #[arg(long)]
        query_file: Option<PathBuf>,
        /// Text encoding of the query file
        #[arg(long, value_enum, default_value_t = QueryEncoding::Utf8, requires = "query_file")]
        query_file_encoding: QueryEncoding,
        /// Pattern separating words on a query-file line
        #[arg(long, default_value = r"\s+")]
        delimiter: String,
        /// Separator between document ids in the output
        #[arg(long, default_value = ",")]
        output_delimiter: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum QueryEncoding {
    Utf8,
    Cp1251,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { dataset, output, codec } => build_index(&dataset, &output, codec),
        Commands::Query { index, codec, query, query_file, query_file_encoding, delimiter, output_delimiter } => {
            let delimiter = Regex::new(&delimiter).with_context(|| format!("invalid delimiter pattern {delimiter:?}"))?;
            let queries = match query_file {
                Some(path) => read_query_file(&path, query_file_encoding, &delimiter)?,
                None => vec![query],
            };
            let index = InvertedIndex::load(&index, codec)
                .with_context(|| format!("failed to load index {} with {codec} codec", index.display()))?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            run_queries(&index, &queries, &output_delimiter, &mut out)?;
            out.flush()?;
            Ok(())
        }
    }
}

fn build_index(dataset: &Path, output: &Path, codec: CodecKind) -> Result<()> {
    let documents = load_documents(dataset)
        .with_context(|| format!("failed to load documents from {}", dataset.display()))?;
    let index = build_inverted_index(&documents);
    index
        .dump(output, codec)
        .with_context(|| format!("failed to dump index to {} with {codec} codec", output.display()))?;
    tracing::info!(output = %output.display(), num_terms = index.len(), "index build complete");
    Ok(())
}

fn read_query_file(path: &Path, encoding: QueryEncoding, delimiter: &Regex) -> Result<Vec<Vec<String>>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read queries from {}", path.display()))?;
    let text = decode_queries(bytes, encoding).with_context(|| format!("failed to decode queries in {}", path.display()))?;
    Ok(text.lines().map(|line| split_query(line, delimiter)).collect())
}

fn decode_queries(bytes: Vec<u8>, encoding: QueryEncoding) -> Result<String> {
    match encoding {
        QueryEncoding::Utf8 => Ok(String::from_utf8(bytes)?),
        QueryEncoding::Cp1251 => {
            let (text, had_errors) = encoding_rs::WINDOWS_1251.decode_without_bom_handling(&bytes);
            if had_errors {
                bail!("query file is not valid cp1251");
            }
            Ok(text.into_owned())
        }
    }
}

fn split_query(line: &str, delimiter: &Regex) -> Vec<String> {
    delimiter
        .split(line.trim())
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// One output line per query; an empty line when nothing matches.
fn run_queries<W: Write>(index: &InvertedIndex, queries: &[Vec<String>], separator: &str, out: &mut W) -> Result<()> {
    for terms in queries {
        let doc_ids = index.query(terms.as_slice());
        tracing::debug!(?terms, hits = doc_ids.len(), "query");
        writeln!(out, "{}", doc_ids.join(separator))?;
    }
    Ok(())
}
