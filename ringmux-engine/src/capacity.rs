//! Capacity type/s describing the fixed capacities within the engine.
//! We integrate the capacity crate to describe the capacities.

/// Describes the different intended fixed capacities used in the engine.
/// ```rust
/// use ringmux_engine::EngineCapacityKind;
/// use capacity::{Capacity, Setting};
///
/// #[derive(Clone, Debug)]
/// pub struct MyCapacity;
///
/// impl Setting<EngineCapacityKind> for MyCapacity {
///     fn setting(&self, v: &EngineCapacityKind) -> usize {
///         match v {
///             EngineCapacityKind::CoreQueue => 256,
///             EngineCapacityKind::ConnSlots => 256,
///         }
///     }
/// }
/// let caps = Capacity::<MyCapacity, EngineCapacityKind>::with_planned(MyCapacity {});
/// ```
#[derive(Clone, Debug)]
pub enum EngineCapacityKind {
    /// io_uring queue capacity, in powers of two.
    CoreQueue,
    /// How many connection slots the arena holds.
    ConnSlots,
}
