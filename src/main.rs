use cfg_gen::{
    DerivationTreeGenerator, Expansion, Generator, GeneratorConfig, RandomIndex,
    SentenceGenerator, bnf, join,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Random sentences and derivation trees from BNF grammars
#[derive(Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to the grammar file
    #[arg(help = "Path to the grammar file")]
    grammar_file: Option<PathBuf>,

    /// Number of derivations to generate
    #[arg(help = "Number of derivations to generate", default_value = "1")]
    count: usize,

    /// Maximum substitutions per sentence, or nodes per tree
    #[arg(long, default_value = "1000")]
    limit: usize,

    /// Order in which non-terminals are expanded
    #[arg(long, value_enum, default_value = "left-first")]
    expansion: ExpansionArg,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print derivation trees instead of sentences
    #[arg(long)]
    tree: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Separator placed between terminals of a sentence
    #[arg(long, default_value = " ")]
    separator: String,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized form of a grammar file
    Format {
        /// Path to the grammar file
        #[arg(help = "Path to the grammar file")]
        grammar_file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExpansionArg {
    LeftFirst,
    LeftToRight,
}

impl From<ExpansionArg> for Expansion {
    fn from(arg: ExpansionArg) -> Self {
        match arg {
            ExpansionArg::LeftFirst => Expansion::LeftFirst,
            ExpansionArg::LeftToRight => Expansion::LeftToRight,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Format { grammar_file }) = cli.command {
        let cfg = bnf::parse_file(&grammar_file)?;
        println!("{}", cfg);
        return Ok(());
    }

    let grammar_file = cli.grammar_file.ok_or("Grammar file path required")?;
    let cfg = bnf::parse_file(&grammar_file)?;
    if !cli.json {
        eprintln!(
            "Loaded {} rules from {}.",
            cfg.rules().len(),
            grammar_file.display()
        );
    }

    let index = match cli.seed {
        Some(seed) => RandomIndex::seeded(seed),
        None => RandomIndex::from_entropy(),
    };
    let config = GeneratorConfig::new(cli.limit).with_expansion(cli.expansion.into());

    if cli.tree {
        let mut generator = DerivationTreeGenerator::with_config(index, config);
        let mut trees = Vec::with_capacity(cli.count);
        for i in 0..cli.count {
            let tree = generator.generate(&cfg)?;
            if cli.json {
                trees.push(tree);
            } else {
                println!("{}.\n{}", i + 1, tree);
            }
        }
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&trees)?);
        }
    } else {
        let mut generator = SentenceGenerator::with_config(index, config);
        let mut sentences = Vec::with_capacity(cli.count);
        for i in 0..cli.count {
            let sentence = join(&generator.generate(&cfg)?, &cli.separator);
            if cli.json {
                sentences.push(sentence);
            } else {
                println!("{}. {}", i + 1, sentence);
            }
        }
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&sentences)?);
        }
    }

    Ok(())
}
