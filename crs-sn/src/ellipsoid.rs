//! Définitions des ellipsoïdes

/// Ellipsoïde de référence défini par son demi-grand axe et son aplatissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Nom court (notation `+ellps=`)
    pub name: &'static str,
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

/// Ellipsoïde WGS84
pub const WGS84: Ellipsoid = Ellipsoid {
    name: "WGS84",
    a: 6378137.0,
    f: 1.0 / 298.257223563,
};

/// Ellipsoïde Clarke 1880 (RGS), utilisé par le Lambert sénégalais
pub const CLARKE_1880: Ellipsoid = Ellipsoid {
    name: "clrk80",
    a: 6378249.145,
    f: 1.0 / 293.4663,
};

impl Ellipsoid {
    /// Recherche un ellipsoïde par son nom `+ellps=` / `+datum=`
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "WGS84" => Some(WGS84),
            "clrk80" => Some(CLARKE_1880),
            _ => None,
        }
    }

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Première excentricité
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Grande normale (rayon de courbure dans le premier vertical)
    pub fn grande_normale(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * lat.sin().powi(2)).sqrt()
    }
}
