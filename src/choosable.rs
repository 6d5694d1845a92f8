/// An identifier for a grounded action or method: the opaque, hashable unit the
/// [`crate::Simulator`] deals in and the engine keys statistics tables with.
///
/// Implementations typically bundle a schema name with its bound argument list
/// (`move(block_a, block_b)`), already grounded by the symbolic planning substrate —
/// the engine never grounds or un-grounds a choice itself.
///
/// # Requirements
///
/// - `Clone` + `Copy` — cheap to duplicate across candidate sets and statistics keys
/// - `Hash` + `Eq` — Q/N table keys
/// - `Debug` — printable in progress traces
pub trait Choosable
where
    Self: Clone + Copy,
    Self: PartialEq + Eq,
    Self: std::hash::Hash,
    Self: std::fmt::Debug,
{
}
