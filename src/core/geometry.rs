use serde::Deserialize;

/// One polygonal face of a building shell, as supplied by the host 3D
/// environment: a unit normal and the face area in m2.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Face {
    pub normal: [f64; 3],
    pub area: f64,
}

/// A closed polyhedral mesh representing one building volume. The engine
/// only reads face normals/areas and the overall bounding height; it never
/// mutates the shell.
#[derive(Clone, Debug)]
pub struct BuildingShell {
    pub faces: Vec<Face>,
    /// Overall bounding height in metres.
    pub height: f64,
}

/// A cluster of vertical faces sharing an orientation. The azimuth is the
/// anchor angle of the first face that opened the group and is never
/// recomputed as later faces merge in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationGroup {
    /// Anchor azimuth in degrees, in [0, 360).
    pub azimuth: f64,
    /// Summed area of the group's faces, in m2.
    pub area: f64,
}

/// Surface quantities derived from a building shell: the single-surface
/// floor/roof area and the vertical area grouped by orientation.
#[derive(Clone, Debug, Default)]
pub struct SurfaceAreaProfile {
    pub horizontal_area: f64,
    pub orientation_groups: Vec<OrientationGroup>,
}

impl SurfaceAreaProfile {
    pub fn total_vertical_area(&self) -> f64 {
        self.orientation_groups.iter().map(|group| group.area).sum()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GeometryConfig {
    /// Tolerance on |normal.z| for classifying a face as horizontal or
    /// vertical. Faces in between are oblique and excluded.
    pub normal_tolerance: f64,
    /// Angular tolerance in degrees for merging a vertical face into an
    /// existing orientation group.
    pub angle_tolerance: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            normal_tolerance: 0.01,
            angle_tolerance: 30.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceClass {
    Horizontal,
    Vertical,
    Oblique,
}

pub fn classify_face(face: &Face, config: &GeometryConfig) -> FaceClass {
    let normal_z = face.normal[2].abs();
    if normal_z >= 1.0 - config.normal_tolerance {
        FaceClass::Horizontal
    } else if normal_z <= config.normal_tolerance {
        FaceClass::Vertical
    } else {
        FaceClass::Oblique
    }
}

/// Azimuth of a vertical face from its outward normal, in degrees
/// normalized to [0, 360).
pub fn face_azimuth(face: &Face) -> f64 {
    face.normal[1].atan2(face.normal[0]).to_degrees().rem_euclid(360.0)
}

/// Distance between two azimuths on the circle, in degrees, at most 180.
fn angular_distance(a: f64, b: f64) -> f64 {
    let difference = (a - b).abs() % 360.0;
    difference.min(360.0 - difference)
}

/// Extract the surface-area profile of a building shell.
///
/// Horizontal faces (|normal.z| within tolerance of 1) are summed and the
/// raw total halved, since both the top and bottom of the shell are counted
/// but downstream components want the single-surface floor/roof area.
///
/// Vertical faces are grouped by greedy first-fit: existing group anchors
/// are scanned in creation order and the face merges into the first anchor
/// within the angular tolerance, otherwise its own azimuth opens a new
/// group. Anchors are fixed at creation; they are not running means.
///
/// Oblique faces contribute to neither total.
pub fn extract_surface_profile(
    shell: &BuildingShell,
    config: &GeometryConfig,
) -> SurfaceAreaProfile {
    let mut horizontal_area_raw = 0.0;
    let mut orientation_groups: Vec<OrientationGroup> = vec![];

    for face in &shell.faces {
        match classify_face(face, config) {
            FaceClass::Horizontal => {
                horizontal_area_raw += face.area;
            }
            FaceClass::Vertical => {
                let azimuth = face_azimuth(face);
                let existing = orientation_groups
                    .iter_mut()
                    .find(|group| angular_distance(group.azimuth, azimuth) <= config.angle_tolerance);
                match existing {
                    Some(group) => group.area += face.area,
                    None => orientation_groups.push(OrientationGroup {
                        azimuth,
                        area: face.area,
                    }),
                }
            }
            FaceClass::Oblique => {}
        }
    }

    SurfaceAreaProfile {
        horizontal_area: horizontal_area_raw / 2.0,
        orientation_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    fn face(normal: [f64; 3], area: f64) -> Face {
        Face { normal, area }
    }

    /// A 10m x 10m x 6m box: floor, roof and four walls.
    #[fixture]
    fn box_shell() -> BuildingShell {
        BuildingShell {
            faces: vec![
                face([0.0, 0.0, -1.0], 100.0),
                face([0.0, 0.0, 1.0], 100.0),
                face([1.0, 0.0, 0.0], 60.0),
                face([0.0, 1.0, 0.0], 60.0),
                face([-1.0, 0.0, 0.0], 60.0),
                face([0.0, -1.0, 0.0], 60.0),
            ],
            height: 6.0,
        }
    }

    #[rstest]
    fn box_profile_halves_horizontal_and_keeps_four_orientations(box_shell: BuildingShell) {
        let profile = extract_surface_profile(&box_shell, &GeometryConfig::default());
        assert_relative_eq!(profile.horizontal_area, 100.0);
        assert_eq!(profile.orientation_groups.len(), 4);
        assert_relative_eq!(profile.total_vertical_area(), 240.0);
        // anchors appear in face scan order: east, north, west, south
        let anchors: Vec<f64> = profile
            .orientation_groups
            .iter()
            .map(|group| group.azimuth)
            .collect();
        for (anchor, expected) in anchors.iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert_relative_eq!(*anchor, expected, epsilon = 1e-9);
        }
    }

    #[rstest]
    fn classification_partitions_all_faces(box_shell: BuildingShell) {
        let mut shell = box_shell;
        // an oblique roof pitch
        let oblique = [0.0, 0.5f64.sqrt(), 0.5f64.sqrt()];
        shell.faces.push(face(oblique, 55.0));

        let config = GeometryConfig::default();
        let counts = shell.faces.iter().fold([0usize; 3], |mut counts, f| {
            match classify_face(f, &config) {
                FaceClass::Horizontal => counts[0] += 1,
                FaceClass::Vertical => counts[1] += 1,
                FaceClass::Oblique => counts[2] += 1,
            }
            counts
        });
        assert_eq!(counts.iter().sum::<usize>(), shell.faces.len());
        assert_eq!(counts, [2, 4, 1]);

        // the oblique face contributes to neither area total
        let profile = extract_surface_profile(&shell, &config);
        assert_relative_eq!(profile.horizontal_area, 100.0);
        assert_relative_eq!(profile.total_vertical_area(), 240.0);
    }

    #[rstest]
    fn first_fit_keeps_the_anchor_of_the_opening_face() {
        let shell = BuildingShell {
            faces: vec![
                face([1.0, 0.0, 0.0], 10.0), // opens a group at 0
                // 20 degrees away: merges into the 0-degree group
                face([20f64.to_radians().cos(), 20f64.to_radians().sin(), 0.0], 5.0),
                // 40 degrees from the anchor: outside tolerance, opens its own
                face([40f64.to_radians().cos(), 40f64.to_radians().sin(), 0.0], 2.0),
            ],
            height: 3.0,
        };
        let profile = extract_surface_profile(&shell, &GeometryConfig::default());
        assert_eq!(profile.orientation_groups.len(), 2);
        assert_relative_eq!(profile.orientation_groups[0].azimuth, 0.0);
        assert_relative_eq!(profile.orientation_groups[0].area, 15.0);
        assert_relative_eq!(profile.orientation_groups[1].azimuth, 40.0, epsilon = 1e-9);
        assert_relative_eq!(profile.orientation_groups[1].area, 2.0);
    }

    #[rstest]
    fn grouping_wraps_around_north() {
        let shell = BuildingShell {
            faces: vec![
                face([355f64.to_radians().cos(), 355f64.to_radians().sin(), 0.0], 4.0),
                face([5f64.to_radians().cos(), 5f64.to_radians().sin(), 0.0], 6.0),
            ],
            height: 3.0,
        };
        let profile = extract_surface_profile(&shell, &GeometryConfig::default());
        assert_eq!(profile.orientation_groups.len(), 1);
        assert_relative_eq!(profile.orientation_groups[0].azimuth, 355.0, epsilon = 1e-9);
        assert_relative_eq!(profile.orientation_groups[0].area, 10.0);
    }

    #[rstest]
    fn permuting_scan_order_may_move_anchors_but_not_total_area(box_shell: BuildingShell) {
        let config = GeometryConfig::default();
        let forward = extract_surface_profile(&box_shell, &config);

        let mut reversed_shell = box_shell;
        reversed_shell.faces.reverse();
        let reversed = extract_surface_profile(&reversed_shell, &config);

        assert_relative_eq!(
            forward.total_vertical_area(),
            reversed.total_vertical_area()
        );
        assert_relative_eq!(forward.horizontal_area, reversed.horizontal_area);
    }

    #[rstest]
    fn shell_without_vertical_faces_is_a_valid_degenerate_profile() {
        let shell = BuildingShell {
            faces: vec![face([0.0, 0.0, 1.0], 50.0), face([0.0, 0.0, -1.0], 50.0)],
            height: 3.0,
        };
        let profile = extract_surface_profile(&shell, &GeometryConfig::default());
        assert_relative_eq!(profile.horizontal_area, 50.0);
        assert!(profile.orientation_groups.is_empty());
    }
}
