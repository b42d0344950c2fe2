/// How far a failure may propagate through an aggregation.
///
/// Used to decide at which level an error is absorbed and turned into
/// absence rather than surfaced to the caller.
///
/// # Behavior Summary
///
/// | Scope | Dropped | Caller sees an error? |
/// |-------|---------|-----------------------|
/// | `Item` | The single asset, rate or liquidity threshold | No |
/// | `Provider` | That provider's snapshot for this cycle | No (diagnostics only) |
/// | `Fatal` | The whole aggregation | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureScope {
    /// Absorbed at the smallest unit: one asset id, one rate, one threshold.
    Item,

    /// The provider is excluded from the result map.
    ///
    /// Timeouts, transport failures and malformed upstream responses land
    /// here. Other providers are unaffected.
    Provider,

    /// The aggregation cannot run at all (no resolvable providers, or a
    /// malformed top-level request).
    Fatal,
}
