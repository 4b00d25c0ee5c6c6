/// Figure layer: what to draw, resolved from the figure table.
///
/// ```text
///   FigureTable ──resolve──► ResolvedFigure ──prepare(load)──► PreparedFigure
///   (built-in + --config)     paths + style                      points + axes
/// ```

pub mod prepare;
pub mod spec;
pub mod table;
