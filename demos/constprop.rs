//! Miniature constant propagation over two control-flow paths.
//!
//! Two branches of an `if` assign different constants; the join point meets
//! the two maps, and a later store through a may-aliasing pointer
//! invalidates what the alias could touch.

use clap::Parser;

use aom_rs::domains::FlatLattice;
use aom_rs::map::AbstractObjectMap;
use aom_rs::object::AbstractObject;

/// A storage location. `region` models which locations a pointer may reach;
/// `unique` marks locations that denote exactly one cell.
#[derive(Debug, Clone, PartialEq)]
struct Loc {
    name: &'static str,
    region: u32,
    unique: bool,
}

impl Loc {
    fn var(name: &'static str, region: u32) -> Self {
        Loc {
            name,
            region,
            unique: true,
        }
    }

    fn deref(name: &'static str, region: u32) -> Self {
        Loc {
            name,
            region,
            unique: false,
        }
    }
}

impl AbstractObject for Loc {
    type Cx = ();
    type Atom = u32;

    fn may_equal(&self, other: &Self, _: &()) -> bool {
        self.region == other.region
    }

    fn must_equal(&self, other: &Self, _: &()) -> bool {
        self.name == other.name && self.unique && other.unique
    }

    fn equal_set(&self, other: &Self, _: &()) -> bool {
        self.name == other.name
    }

    fn is_live(&self, _: &()) -> bool {
        true
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Log verbosity for the map's internal tracing.
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let x = Loc::var("x", 1);
    let y = Loc::var("y", 2);
    // *p may reach y but no other variable
    let p = Loc::deref("*p", 2);

    // then-branch: x = 1; y = 2
    let mut then_facts = AbstractObjectMap::new(FlatLattice::<i64>::Bottom);
    then_facts.insert(x.clone(), FlatLattice::Known(1), &());
    then_facts.insert(y.clone(), FlatLattice::Known(2), &());

    // else-branch: x = 7; y = 2
    let mut else_facts = AbstractObjectMap::new(FlatLattice::<i64>::Bottom);
    else_facts.insert(x.clone(), FlatLattice::Known(7), &());
    else_facts.insert(y.clone(), FlatLattice::Known(2), &());

    // join point
    then_facts.meet_update(&else_facts, &());
    println!("after join:");
    println!("  x = {:?}", then_facts.get(&x, &())); // Top: 1 vs 7
    println!("  y = {:?}", then_facts.get(&y, &())); // Known(2) on both paths

    // *p = read(): anything p may reach becomes unknown
    then_facts.set_ml_value_to_full(&p, &());
    println!("after store through *p:");
    println!("  x = {:?}", then_facts.get(&x, &()));
    println!("  y = {:?}", then_facts.get(&y, &()));

    Ok(())
}
