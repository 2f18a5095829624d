//! Compiled-in reference catalogs for exercises and foods.
//!
//! Seeds are immutable and keyed by slug; sessions and food entries store the
//! slug only. Food seeds carry macronutrient density per 100 g.

use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Exercise seeds
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExerciseSeed {
  pub slug: &'static str,
  pub name_en: &'static str,
  pub name_es: &'static str,
  pub muscle_group: &'static str,
}

pub const EXERCISES: &[ExerciseSeed] = &[
  ExerciseSeed { slug: "bench-press", name_en: "Bench press", name_es: "Press de banca", muscle_group: "chest" },
  ExerciseSeed { slug: "incline-dumbbell-press", name_en: "Incline dumbbell press", name_es: "Press inclinado con mancuernas", muscle_group: "chest" },
  ExerciseSeed { slug: "squat", name_en: "Back squat", name_es: "Sentadilla", muscle_group: "quads" },
  ExerciseSeed { slug: "leg-press", name_en: "Leg press", name_es: "Prensa de piernas", muscle_group: "quads" },
  ExerciseSeed { slug: "deadlift", name_en: "Deadlift", name_es: "Peso muerto", muscle_group: "back" },
  ExerciseSeed { slug: "barbell-row", name_en: "Barbell row", name_es: "Remo con barra", muscle_group: "back" },
  ExerciseSeed { slug: "lat-pulldown", name_en: "Lat pulldown", name_es: "Jalón al pecho", muscle_group: "back" },
  ExerciseSeed { slug: "overhead-press", name_en: "Overhead press", name_es: "Press militar", muscle_group: "shoulders" },
  ExerciseSeed { slug: "lateral-raise", name_en: "Lateral raise", name_es: "Elevaciones laterales", muscle_group: "shoulders" },
  ExerciseSeed { slug: "biceps-curl", name_en: "Biceps curl", name_es: "Curl de bíceps", muscle_group: "biceps" },
  ExerciseSeed { slug: "hammer-curl", name_en: "Hammer curl", name_es: "Curl martillo", muscle_group: "biceps" },
  ExerciseSeed { slug: "triceps-pushdown", name_en: "Triceps pushdown", name_es: "Extensión de tríceps en polea", muscle_group: "triceps" },
  ExerciseSeed { slug: "romanian-deadlift", name_en: "Romanian deadlift", name_es: "Peso muerto rumano", muscle_group: "hamstrings" },
  ExerciseSeed { slug: "calf-raise", name_en: "Standing calf raise", name_es: "Elevación de gemelos", muscle_group: "calves" },
  ExerciseSeed { slug: "hip-thrust", name_en: "Hip thrust", name_es: "Empuje de cadera", muscle_group: "glutes" },
  ExerciseSeed { slug: "plank", name_en: "Plank", name_es: "Plancha", muscle_group: "core" },
];

pub fn exercise(slug: &str) -> Option<&'static ExerciseSeed> {
  EXERCISES.iter().find(|e| e.slug == slug)
}

/// ---------------------------------------------------------------------------
/// Food seeds (macros per 100 g)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FoodSeed {
  pub slug: &'static str,
  pub name_en: &'static str,
  pub name_es: &'static str,
  pub protein_g: f64,
  pub carbs_g: f64,
  pub fat_g: f64,
  pub kcal: f64,
}

pub const FOODS: &[FoodSeed] = &[
  FoodSeed { slug: "chicken-breast", name_en: "Chicken breast", name_es: "Pechuga de pollo", protein_g: 23.0, carbs_g: 0.0, fat_g: 2.0, kcal: 110.0 },
  FoodSeed { slug: "hake", name_en: "Hake", name_es: "Merluza", protein_g: 22.5, carbs_g: 0.0, fat_g: 1.5, kcal: 104.0 },
  FoodSeed { slug: "salmon", name_en: "Salmon", name_es: "Salmón", protein_g: 20.0, carbs_g: 0.0, fat_g: 13.0, kcal: 208.0 },
  FoodSeed { slug: "egg", name_en: "Egg", name_es: "Huevo", protein_g: 12.5, carbs_g: 0.7, fat_g: 9.5, kcal: 143.0 },
  FoodSeed { slug: "white-rice", name_en: "White rice (cooked)", name_es: "Arroz blanco (cocido)", protein_g: 2.7, carbs_g: 28.0, fat_g: 0.3, kcal: 130.0 },
  FoodSeed { slug: "pasta", name_en: "Pasta (cooked)", name_es: "Pasta (cocida)", protein_g: 5.8, carbs_g: 31.0, fat_g: 0.9, kcal: 158.0 },
  FoodSeed { slug: "oats", name_en: "Rolled oats", name_es: "Copos de avena", protein_g: 13.5, carbs_g: 57.5, fat_g: 7.0, kcal: 379.0 },
  FoodSeed { slug: "potato", name_en: "Potato (boiled)", name_es: "Patata (cocida)", protein_g: 1.9, carbs_g: 20.0, fat_g: 0.1, kcal: 87.0 },
  FoodSeed { slug: "whole-bread", name_en: "Whole-grain bread", name_es: "Pan integral", protein_g: 9.0, carbs_g: 41.0, fat_g: 3.5, kcal: 247.0 },
  FoodSeed { slug: "banana", name_en: "Banana", name_es: "Plátano", protein_g: 1.1, carbs_g: 23.0, fat_g: 0.3, kcal: 89.0 },
  FoodSeed { slug: "apple", name_en: "Apple", name_es: "Manzana", protein_g: 0.3, carbs_g: 14.0, fat_g: 0.2, kcal: 52.0 },
  FoodSeed { slug: "olive-oil", name_en: "Olive oil", name_es: "Aceite de oliva", protein_g: 0.0, carbs_g: 0.0, fat_g: 100.0, kcal: 884.0 },
  FoodSeed { slug: "greek-yogurt", name_en: "Greek yogurt", name_es: "Yogur griego", protein_g: 10.0, carbs_g: 3.6, fat_g: 5.0, kcal: 97.0 },
  FoodSeed { slug: "lentils", name_en: "Lentils (cooked)", name_es: "Lentejas (cocidas)", protein_g: 9.0, carbs_g: 20.0, fat_g: 0.4, kcal: 116.0 },
  FoodSeed { slug: "almonds", name_en: "Almonds", name_es: "Almendras", protein_g: 21.0, carbs_g: 22.0, fat_g: 50.0, kcal: 579.0 },
  FoodSeed { slug: "whey-protein", name_en: "Whey protein powder", name_es: "Proteína de suero", protein_g: 80.0, carbs_g: 7.0, fat_g: 6.0, kcal: 400.0 },
];

pub fn food(slug: &str) -> Option<&'static FoodSeed> {
  FOODS.iter().find(|f| f.slug == slug)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
