mod normals;

pub use normals::vertex_normals;

use indexmap::IndexMap;

use crate::math::Point3;

/// An indexed triangle mesh.
///
/// Indices reference this mesh's own vertex array only; meshes belonging
/// to different groups never share vertices.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh from vertex and index buffers.
    #[must_use]
    pub fn new(vertices: Vec<Point3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if every triangle references an existing vertex.
    #[must_use]
    pub fn indices_in_bounds(&self) -> bool {
        let n = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        self.indices
            .iter()
            .all(|tri| tri.iter().all(|&i| i < n))
    }

    /// Returns the corner positions of triangle `t`.
    #[must_use]
    pub fn triangle(&self, t: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[t];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}

/// An ordered mapping from group name to mesh.
///
/// Groups are the unit of material tagging, noise selection, and the
/// export boundary; insertion order is preserved because the downstream
/// serializer emits groups in registry order.
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: IndexMap<String, TriangleMesh>,
}

impl GroupSet {
    /// Creates an empty group set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a group, replacing any previous mesh under the same name.
    pub fn insert(&mut self, name: impl Into<String>, mesh: TriangleMesh) {
        self.groups.insert(name.into(), mesh);
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TriangleMesh> {
        self.groups.get(name)
    }

    /// Returns `true` if a group with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TriangleMesh)> {
        self.groups.iter().map(|(name, mesh)| (name.as_str(), mesh))
    }

    /// Group names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Concatenates the named groups into a single mesh, rebasing the
    /// triangle indices of each appended group past the vertices already
    /// gathered. Missing names are skipped.
    #[must_use]
    pub fn combined(&self, names: &[&str]) -> TriangleMesh {
        let mut out = TriangleMesh::default();
        for name in names {
            let Some(mesh) = self.groups.get(*name) else {
                continue;
            };
            if mesh.vertices.is_empty() || mesh.indices.is_empty() {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let base = out.vertices.len() as u32;
            out.vertices.extend_from_slice(&mesh.vertices);
            out.indices
                .extend(mesh.indices.iter().map(|[a, b, c]| [a + base, b + base, c + base]));
        }
        out
    }
}

impl FromIterator<(String, TriangleMesh)> for GroupSet {
    fn from_iter<T: IntoIterator<Item = (String, TriangleMesh)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
