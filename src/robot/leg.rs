use core::fmt::Display;
use core::ops::{Index, IndexMut};

use crate::kinematics::oscillator::Oscillator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Left = 0,
    Mid = 1,
    Right = 2,
}

impl Leg {
    pub const ALL: [Leg; 3] = [Leg::Left, Leg::Mid, Leg::Right];
}

impl Display for Leg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Leg::Left => f.write_str("left"),
            Leg::Mid => f.write_str("mid"),
            Leg::Right => f.write_str("right"),
        }
    }
}

impl Index<Leg> for [f32; 3] {
    type Output = f32;

    fn index(&self, leg: Leg) -> &Self::Output {
        &self[leg as usize]
    }
}

impl IndexMut<Leg> for [f32; 3] {
    fn index_mut(&mut self, leg: Leg) -> &mut Self::Output {
        &mut self[leg as usize]
    }
}

impl Index<Leg> for [i8; 3] {
    type Output = i8;

    fn index(&self, leg: Leg) -> &Self::Output {
        &self[leg as usize]
    }
}

impl IndexMut<Leg> for [i8; 3] {
    fn index_mut(&mut self, leg: Leg) -> &mut Self::Output {
        &mut self[leg as usize]
    }
}

impl Index<Leg> for [Oscillator; 3] {
    type Output = Oscillator;

    fn index(&self, leg: Leg) -> &Self::Output {
        &self[leg as usize]
    }
}

impl IndexMut<Leg> for [Oscillator; 3] {
    fn index_mut(&mut self, leg: Leg) -> &mut Self::Output {
        &mut self[leg as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_legs_in_index_order() {
        for (index, leg) in Leg::ALL.into_iter().enumerate() {
            assert_eq!(leg as usize, index);
        }
        let mut angles = [0.0f32; 3];
        angles[Leg::Right] = 5.0;
        assert_eq!(angles, [0.0, 0.0, 5.0]);
    }
}
