//! FOLD document model: parsing, validation and normalization.

use serde_json::{Map, Value};

/// Fold assignment of a single edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assignment {
	/// Paper boundary (`B`).
	Boundary,
	/// Mountain fold (`M`).
	Mountain,
	/// Valley fold (`V`).
	Valley,
	/// Flat crease (`F`).
	Flat,
	/// Unassigned crease (`U`).
	Unassigned,
}

impl Assignment {
	/// Every assignment, in legend and draw order.
	pub const ALL: [Self; 5] = [
		Self::Boundary,
		Self::Mountain,
		Self::Valley,
		Self::Flat,
		Self::Unassigned,
	];

	/// Decodes a FOLD `edges_assignment` code.
	pub fn from_code(code: &str) -> Option<Self> {
		match code {
			"B" | "b" => Some(Self::Boundary),
			"M" | "m" => Some(Self::Mountain),
			"V" | "v" => Some(Self::Valley),
			"F" | "f" => Some(Self::Flat),
			"U" | "u" => Some(Self::Unassigned),
			_ => None,
		}
	}

	/// Human readable name, used by the legend.
	pub fn label(self) -> &'static str {
		match self {
			Self::Boundary => "Boundary",
			Self::Mountain => "Mountain",
			Self::Valley => "Valley",
			Self::Flat => "Flat",
			Self::Unassigned => "Unassigned",
		}
	}
}

/// Structural problems in otherwise well-formed JSON.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
	#[error("FOLD document must be a JSON object")]
	NotAnObject,

	#[error("missing required field `{field}`")]
	MissingField { field: &'static str },

	#[error("`{field}` must be an array")]
	NotAnArray { field: &'static str },

	#[error("`{field}[{index}]` {reason}")]
	MalformedEntry {
		field: &'static str,
		index: usize,
		reason: &'static str,
	},
}

/// Failure to turn text into a [`FoldDocument`].
#[derive(Debug, thiserror::Error)]
pub enum FoldError {
	#[error("Error parsing FOLD data: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("Error parsing FOLD data: {0}")]
	Validation(#[from] ValidationError),
}

impl FoldError {
	/// True when one of the two required arrays is absent.
	///
	/// The preview treats this as "nothing to draw" rather than an error.
	pub fn is_missing_required(&self) -> bool {
		matches!(
			self,
			Self::Validation(ValidationError::MissingField { .. })
		)
	}
}

const VERTICES: &str = "vertices_coords";
const EDGES: &str = "edges_vertices";
const ASSIGNMENTS: &str = "edges_assignment";
const FACES: &str = "faces_vertices";

/// A normalized crease pattern.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoldDocument {
	/// Vertex coordinates, index = vertex id.
	pub vertices: Vec<[f64; 2]>,
	/// Edge endpoints, index = edge id. Ids may be out of range.
	pub edges: Vec<[usize; 2]>,
	/// One entry per edge; `None` marks an unrecognized code.
	pub assignments: Vec<Option<Assignment>>,
	/// Face vertex loops, `Some` whenever `faces_vertices` is an array.
	pub faces: Option<Vec<Vec<usize>>>,
	/// Remaining top-level fields, kept verbatim.
	pub extra: Map<String, Value>,
}

impl FoldDocument {
	/// Parses and validates FOLD JSON text.
	pub fn parse(text: &str) -> Result<Self, FoldError> {
		let value: Value = serde_json::from_str(text)?;
		Ok(Self::from_value(value)?)
	}

	/// Validates an already decoded JSON value.
	pub fn from_value(value: Value) -> Result<Self, ValidationError> {
		let Value::Object(mut root) = value else {
			return Err(ValidationError::NotAnObject);
		};

		let vertices = take_array(&mut root, VERTICES)?
			.iter()
			.enumerate()
			.map(|(index, v)| parse_coord(v).ok_or(ValidationError::MalformedEntry {
				field: VERTICES,
				index,
				reason: "must be a list of at least two numbers",
			}))
			.collect::<Result<Vec<_>, _>>()?;

		let edges = take_array(&mut root, EDGES)?
			.iter()
			.enumerate()
			.map(|(index, e)| parse_edge(e).ok_or(ValidationError::MalformedEntry {
				field: EDGES,
				index,
				reason: "must be a pair of vertex indices",
			}))
			.collect::<Result<Vec<_>, _>>()?;

		// Missing or short assignment lists pad with Unassigned.
		let mut assignments: Vec<Option<Assignment>> = match root.remove(ASSIGNMENTS) {
			Some(Value::Array(codes)) => codes
				.iter()
				.map(|c| c.as_str().and_then(Assignment::from_code))
				.collect(),
			_ => Vec::new(),
		};
		assignments.resize(edges.len(), Some(Assignment::Unassigned));

		let faces = match root.remove(FACES) {
			Some(Value::Array(items)) => Some(
				items
					.iter()
					.enumerate()
					.map(|(index, f)| {
						parse_face(f).ok_or(ValidationError::MalformedEntry {
							field: FACES,
							index,
							reason: "must be a list of vertex indices",
						})
					})
					.collect::<Result<Vec<_>, _>>()?,
			),
			_ => None,
		};

		Ok(Self {
			vertices,
			edges,
			assignments,
			faces,
			extra: root,
		})
	}

	/// Number of edge or face references to vertices that do not exist.
	pub fn dangling_references(&self) -> usize {
		let n = self.vertices.len();
		let from_edges = self.edges.iter().flatten().filter(|&&v| v >= n).count();
		let from_faces = self
			.faces
			.iter()
			.flatten()
			.flatten()
			.filter(|&&v| v >= n)
			.count();
		from_edges + from_faces
	}

	/// Whether the document carries face data (any array, even empty).
	pub fn has_faces(&self) -> bool {
		self.faces.is_some()
	}
}

fn take_array(root: &mut Map<String, Value>, field: &'static str) -> Result<Vec<Value>, ValidationError> {
	match root.remove(field) {
		None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
		Some(Value::Array(items)) => Ok(items),
		Some(_) => Err(ValidationError::NotAnArray { field }),
	}
}

fn parse_coord(value: &Value) -> Option<[f64; 2]> {
	let items = value.as_array()?;
	if items.len() < 2 {
		return None;
	}
	let (x, y) = (items[0].as_f64()?, items[1].as_f64()?);
	(x.is_finite() && y.is_finite()).then_some([x, y])
}

/// Vertex id that never resolves; stands in for negative or fractional ids.
const NO_VERTEX: usize = usize::MAX;

/// Decodes a vertex id. Any number is accepted; ids that cannot name a
/// vertex map to [`NO_VERTEX`] so only the referencing element is skipped.
fn parse_index(value: &Value) -> Option<usize> {
	if !value.is_number() {
		return None;
	}
	// Whole floats such as `1.0` still name a vertex.
	let whole = value.as_u64().or_else(|| {
		value
			.as_f64()
			.filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
			.map(|f| f as u64)
	});
	Some(whole.and_then(|v| usize::try_from(v).ok()).unwrap_or(NO_VERTEX))
}

fn parse_edge(value: &Value) -> Option<[usize; 2]> {
	match value.as_array()?.as_slice() {
		[a, b] => Some([parse_index(a)?, parse_index(b)?]),
		_ => None,
	}
}

fn parse_face(value: &Value) -> Option<Vec<usize>> {
	value.as_array()?.iter().map(parse_index).collect()
}
