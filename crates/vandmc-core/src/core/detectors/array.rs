use super::primitive::{Primitive, SizeClass};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct DetectorId;
}

/// Which reaction product a detector is meant to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorRole {
    Ejectile,
    Recoil,
    Dual,
}

impl DetectorRole {
    /// Maps the detector-file type column. `recoil` and `dual` are recognized,
    /// everything else (e.g. `vandle`) detects ejectiles.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "recoil" => DetectorRole::Recoil,
            "dual" => DetectorRole::Dual,
            _ => DetectorRole::Ejectile,
        }
    }

    pub fn detects_ejectiles(self) -> bool {
        matches!(self, DetectorRole::Ejectile | DetectorRole::Dual)
    }

    pub fn detects_recoils(self) -> bool {
        matches!(self, DetectorRole::Recoil | DetectorRole::Dual)
    }
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub primitive: Primitive,
    pub role: DetectorRole,
    /// Type column as read, e.g. `vandle` or `recoil`.
    pub kind: String,
    /// Subtype column, usually the bar size name.
    pub subtype: String,
    pub material: String,
}

impl Detector {
    pub fn new(primitive: Primitive, kind: &str) -> Self {
        let subtype = primitive
            .size_class()
            .map(SizeClass::name)
            .unwrap_or("custom")
            .to_string();
        Self {
            primitive,
            role: DetectorRole::from_type_name(kind),
            kind: kind.to_string(),
            subtype,
            material: String::new(),
        }
    }

    /// One row in the detector CSV format:
    /// `x,y,z,theta,phi,psi,type,subtype,length,width,depth,material`.
    pub fn detector_line(&self) -> String {
        let p = &self.primitive;
        let (theta, phi, psi) = p.rotation();
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            p.position().x,
            p.position().y,
            p.position().z,
            theta,
            phi,
            psi,
            self.kind,
            self.subtype,
            p.length(),
            p.width(),
            p.depth(),
            self.material
        )
    }
}

/// Detectors keyed by stable ids, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DetectorArray {
    detectors: SlotMap<DetectorId, Detector>,
    order: Vec<DetectorId>,
}

impl DetectorArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, detector: Detector) -> DetectorId {
        let id = self.detectors.insert(detector);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: DetectorId) -> Option<Detector> {
        let detector = self.detectors.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(detector)
    }

    pub fn get(&self, id: DetectorId) -> Option<&Detector> {
        self.detectors.get(id)
    }

    pub fn get_mut(&mut self, id: DetectorId) -> Option<&mut Detector> {
        self.detectors.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of `id` in insertion order, used as the bar number in output.
    pub fn index_of(&self, id: DetectorId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetectorId, &Detector)> + '_ {
        self.order.iter().map(|&id| (id, &self.detectors[id]))
    }

    pub fn count_role(&self, role: DetectorRole) -> usize {
        self.iter().filter(|(_, d)| d.role == role).count()
    }
}

impl FromIterator<Detector> for DetectorArray {
    fn from_iter<I: IntoIterator<Item = Detector>>(iter: I) -> Self {
        let mut array = Self::new();
        for detector in iter {
            array.add(detector);
        }
        array
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn role_is_parsed_from_type_column() {
        assert_eq!(DetectorRole::from_type_name("vandle"), DetectorRole::Ejectile);
        assert_eq!(DetectorRole::from_type_name("Recoil"), DetectorRole::Recoil);
        assert_eq!(DetectorRole::from_type_name(" dual "), DetectorRole::Dual);
        assert!(DetectorRole::Dual.detects_ejectiles());
        assert!(DetectorRole::Dual.detects_recoils());
        assert!(!DetectorRole::Recoil.detects_ejectiles());
    }

    #[test]
    fn detector_takes_subtype_from_size_class() {
        let detector = Detector::new(Primitive::standard(SizeClass::Large), "vandle");
        assert_eq!(detector.subtype, "large");
        let custom = Detector::new(Primitive::new(1.0, 1.0, 1.0).unwrap(), "recoil");
        assert_eq!(custom.subtype, "custom");
        assert_eq!(custom.role, DetectorRole::Recoil);
    }

    #[test]
    fn detector_line_lists_all_columns() {
        let mut primitive = Primitive::standard(SizeClass::Small);
        primitive.set_position(Vector3::new(0.0, 0.5, 1.0));
        let mut detector = Detector::new(primitive, "vandle");
        detector.material = "EJ200".to_string();
        assert_eq!(
            detector.detector_line(),
            "0,0.5,1,0,0,0,vandle,small,0.6,0.03,0.03,EJ200"
        );
    }

    #[test]
    fn array_preserves_insertion_order_across_removal() {
        let mut array = DetectorArray::new();
        let a = array.add(Detector::new(Primitive::standard(SizeClass::Small), "vandle"));
        let b = array.add(Detector::new(Primitive::standard(SizeClass::Medium), "vandle"));
        let c = array.add(Detector::new(Primitive::standard(SizeClass::Large), "recoil"));
        assert_eq!(array.len(), 3);
        assert_eq!(array.index_of(c), Some(2));

        assert!(array.remove(b).is_some());
        assert!(array.remove(b).is_none());
        let d = array.add(Detector::new(Primitive::standard(SizeClass::Small), "dual"));
        let ids: Vec<DetectorId> = array.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c, d]);
        assert_eq!(array.count_role(DetectorRole::Recoil), 1);
        assert!(array.get(b).is_none());
    }

    #[test]
    fn array_collects_from_iterator() {
        let array: DetectorArray = (0..4)
            .map(|_| Detector::new(Primitive::standard(SizeClass::Small), "vandle"))
            .collect();
        assert_eq!(array.len(), 4);
        assert!(!array.is_empty());
    }
}
