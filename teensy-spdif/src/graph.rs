/// The audio graph's side of the periodic tick.
///
/// The transmit interrupt calls [`update_all`](AudioGraph::update_all) once
/// per ring half, after the freshly encoded samples are in place. The graph
/// typically renders its next period and hands the result back through
/// [`AudioOutputSpdif::produce`](crate::io::AudioOutputSpdif::produce).
///
/// Any `FnMut()` closure is an `AudioGraph`.
pub trait AudioGraph {
    /// Process one period.
    fn update_all(&mut self);
}

impl<F: FnMut()> AudioGraph for F {
    fn update_all(&mut self) {
        self()
    }
}
