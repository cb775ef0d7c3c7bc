//! This example plans a small checkout flow.
//!
//! It shows how to:
//! 1. Declare a prerequisite on a unit type.
//! 2. Declare data a unit emits and data a unit requires.
//! 3. Add an explicit ordering constraint at registration.
//! 4. Print the resulting order, as a mermaid graph and as JSON.
//!
//! Run with `cargo run --example checkout --features logging` to see the
//! planner's logs.

use bizflow::{Bizlogic, Declarations, FlowBuilder, UnitType};

struct Cart;
struct Address;

struct Authenticate;

impl Bizlogic for Authenticate {}

struct LoadCart;

impl Bizlogic for LoadCart {
    fn declare(decl: &mut Declarations) {
        decl.depends_on::<Authenticate>().emits::<Cart>();
    }
}

struct LoadAddress;

impl Bizlogic for LoadAddress {
    fn declare(decl: &mut Declarations) {
        decl.depends_on::<Authenticate>()
            .emits_named::<Address>("shipping");
    }
}

struct ValidateStock;

impl Bizlogic for ValidateStock {
    fn declare(decl: &mut Declarations) {
        decl.inject::<Cart>();
    }
}

struct PlaceOrder;

impl Bizlogic for PlaceOrder {
    fn declare(decl: &mut Declarations) {
        decl.inject::<Cart>().inject_named::<Address>("shipping");
    }
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    bizflow::init_logging()?;

    let mut builder = FlowBuilder::new();
    builder
        .add_after::<PlaceOrder>([UnitType::of::<ValidateStock>()])
        .add::<LoadCart>()
        .add::<LoadAddress>();

    let flow = builder.build()?;

    for (index, stage) in flow.stages().iter().enumerate() {
        let names: Vec<_> = stage.iter().map(UnitType::name).collect();
        println!("stage {index}: {}", names.join(", "));
    }

    println!("\n{flow}");
    println!("{}", flow.plan().to_json()?);

    Ok(())
}
