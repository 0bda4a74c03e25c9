use cfg_gen::{DerivationTreeGenerator, Generator, RandomIndex, SentenceGenerator, bnf, join};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = bnf::parse(
        r#"
        <expr> ::= <num> | <var> | '(' <expr> <op> <expr> ')'
        <op>   ::= + | - | * | /
        <var>  ::= x | y
        <num>  ::= 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
        "#,
    )?;

    println!("{}\n", cfg);

    let mut generator = SentenceGenerator::new(RandomIndex::seeded(2024), 100);
    for i in 0..5 {
        match generator.generate(&cfg) {
            Ok(sentence) => println!("{}. {}", i + 1, join(&sentence, "")),
            Err(err) => println!("{}. {}", i + 1, err),
        }
    }

    let mut generator = DerivationTreeGenerator::new(RandomIndex::seeded(7), 64);
    match generator.generate(&cfg) {
        Ok(tree) => {
            println!("\n{}", tree);
            println!("\n{}", serde_json::to_string_pretty(&tree)?);
        }
        Err(err) => println!("\n{}", err),
    }

    Ok(())
}
