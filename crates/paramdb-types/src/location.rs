bitflags::bitflags! {
    /// Physical location of a parameter within the mesh cell it describes.
    ///
    /// Combinable: a flux tallied at the corners of the top face is
    /// `TOP | CORNERS`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Location: u16 {
        /// Cell centroid.
        const CENTROID = 0x0001;
        /// Top face.
        const TOP = 0x0002;
        /// Bottom face.
        const BOTTOM = 0x0004;
        /// Average over the cell.
        const AVERAGE = 0x0008;
        /// Maximum over the cell.
        const MAX = 0x0010;
        /// Cell corner points.
        const CORNERS = 0x0020;
        /// Cell edge midpoints.
        const EDGES = 0x0040;
        /// Integrated over the cell volume.
        const VOLUME_INTEGRATED = 0x0080;
        /// Distributed over the node's children.
        const CHILDREN = 0x0100;
    }
}
