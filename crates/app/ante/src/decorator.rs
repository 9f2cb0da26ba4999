//! The decorator seam and the continuation that chains decorators.

use tollgate_core::AnteResult;
use tollgate_tx::Tx;

use crate::context::Context;

/// One admission step.
///
/// A decorator either rejects, returns early (skipping the rest of the
/// chain), or hands the possibly updated context to `next`.
pub trait AnteDecorator: Send + Sync {
    fn ante_handle(
        &self,
        ctx: Context,
        tx: &mut Tx,
        simulate: bool,
        next: Next<'_>,
    ) -> AnteResult<Context>;
}

/// The decorators still to run.
pub struct Next<'a> {
    rest: &'a [Box<dyn AnteDecorator>],
}

impl<'a> Next<'a> {
    pub fn new(rest: &'a [Box<dyn AnteDecorator>]) -> Self {
        Self { rest }
    }

    /// Run the remaining decorators. An exhausted chain returns `ctx`.
    pub fn run(self, ctx: Context, tx: &mut Tx, simulate: bool) -> AnteResult<Context> {
        match self.rest.split_first() {
            Some((head, tail)) => head.ante_handle(ctx, tx, simulate, Next::new(tail)),
            None => Ok(ctx),
        }
    }
}

/// A named, fixed sequence of decorators.
pub struct AnteChain {
    name: &'static str,
    decorators: Vec<Box<dyn AnteDecorator>>,
}

impl AnteChain {
    pub fn new(name: &'static str, decorators: Vec<Box<dyn AnteDecorator>>) -> Self {
        Self { name, decorators }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    pub fn run(&self, ctx: Context, tx: &mut Tx, simulate: bool) -> AnteResult<Context> {
        Next::new(&self.decorators).run(ctx, tx, simulate)
    }
}
