/// The ordered phases of a single machine tick.
///
/// The microcode compiler leans on the derived `Ord`: a control consumed in an
/// earlier phase must never be reordered after one consumed in a later phase,
/// which is exactly the constraint the step merger checks.
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TickPhase {
    /// The controller decides which control lines to assert.
    Control,
    /// Components with an asserted write control drive their bus.
    Write,
    /// Components with an asserted read control latch from their bus.
    Read,
    /// Internal updates: counter increment/decrement/reset, manual clears.
    Process,
    /// Auto-clearing of control lines and bus slots.
    Clear,
}
