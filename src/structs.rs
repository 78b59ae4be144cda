use super::*;

/// 3D vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Vector {
        Vector {
            x,
            y,
            z
        }
    }

    /// Calculates vector magnitude.
    pub fn magnitude(&self) -> f64 {
        (self.x*self.x + self.y*self.y + self.z*self.z).sqrt()
    }

    /// Assigns vector values from another vector.
    pub fn assign(&mut self, other: &Vector) {
        self.x = other.x;
        self.y = other.y;
        self.z = other.z;
    }

    /// Adds another vector to this one in place.
    pub fn add(&mut self, other: &Vector) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }

    /// Subtracts another vector from this one in place.
    pub fn subtract(&mut self, other: &Vector) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }

    /// Scales all components by a factor.
    pub fn scale(&mut self, factor: f64) {
        self.x *= factor;
        self.y *= factor;
        self.z *= factor;
    }

    /// Normalizes vector components to magnitude 1. A zero-length vector
    /// cannot be normalized and indicates corrupt input.
    pub fn normalize(&mut self) -> Result<(), StatError> {
        let magnitude = self.magnitude();
        if magnitude == 0. {
            return Err(StatError::DegenerateVector);
        }
        self.x /= magnitude;
        self.y /= magnitude;
        self.z /= magnitude;
        Ok(())
    }

    /// Euclidean distance to another vector.
    pub fn distance(&self, other: &Vector) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x*other.x + self.y*other.y + self.z*other.z
    }

    /// Cross product following the right-hand rule.
    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y*other.z - self.z*other.y,
            self.z*other.x - self.x*other.z,
            self.x*other.y - self.y*other.x,
        )
    }

    /// Rotates in place about the z-axis by an angle in degrees.
    pub fn rotate_about_z(&mut self, angle_degrees: f64) {
        let rangle = angle_degrees*PI/180.;
        let (x, y) = (self.x, self.y);
        self.x = rangle.cos()*x - rangle.sin()*y;
        self.y = rangle.sin()*x + rangle.cos()*y;
    }

    /// Rotates in place about the y-axis by an angle in degrees.
    pub fn rotate_about_y(&mut self, angle_degrees: f64) {
        let rangle = angle_degrees*PI/180.;
        let (x, z) = (self.x, self.z);
        self.x = rangle.cos()*x + rangle.sin()*z;
        self.z = -rangle.sin()*x + rangle.cos()*z;
    }

    /// Removes the component of this vector parallel to `normal`, leaving the
    /// projection onto the plane through the origin with that normal.
    pub fn project_onto_plane(&mut self, normal: &Vector) -> Result<(), StatError> {
        let d = self.dot(normal)/normal.magnitude();
        let mut parallel = normal.clone();
        parallel.normalize()?;
        parallel.scale(d);
        self.subtract(&parallel);
        Ok(())
    }
}

/// Rotation about an arbitrary axis through the origin.
#[derive(Clone, Debug)]
pub struct RotationMatrix {
    pub rot: [[f64; 3]; 3],
}

impl RotationMatrix {
    /// Builds the Rodrigues rotation matrix
    /// `R = I cos(theta) + sin(theta) [k]x + (1 - cos(theta)) (k (x) k)`
    /// for a rotation of `angle_degrees` about `axis`. The axis is normalized
    /// internally.
    pub fn about_axis(axis: &Vector, angle_degrees: f64) -> Result<RotationMatrix, StatError> {
        let mut k = axis.clone();
        k.normalize()?;

        let rangle = angle_degrees*PI/180.;
        let c = rangle.cos();
        let s = rangle.sin();

        let mut rot = [[0.; 3]; 3];
        rot[0][0] = k.x*k.x*(1. - c) + c;
        rot[0][1] = k.x*k.y*(1. - c) - k.z*s;
        rot[0][2] = k.x*k.z*(1. - c) + k.y*s;

        rot[1][0] = k.y*k.x*(1. - c) + k.z*s;
        rot[1][1] = k.y*k.y*(1. - c) + c;
        rot[1][2] = k.y*k.z*(1. - c) - k.x*s;

        rot[2][0] = k.z*k.x*(1. - c) - k.y*s;
        rot[2][1] = k.z*k.y*(1. - c) + k.x*s;
        rot[2][2] = k.z*k.z*(1. - c) + c;

        Ok(RotationMatrix { rot })
    }

    /// Plain matrix-vector product.
    pub fn apply(&self, vector: &Vector) -> Vector {
        Vector::new(
            self.rot[0][0]*vector.x + self.rot[0][1]*vector.y + self.rot[0][2]*vector.z,
            self.rot[1][0]*vector.x + self.rot[1][1]*vector.y + self.rot[1][2]*vector.z,
            self.rot[2][0]*vector.x + self.rot[2][1]*vector.y + self.rot[2][2]*vector.z,
        )
    }
}
