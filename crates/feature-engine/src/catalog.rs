//! Built-in form schemas
//!
//! Column orders match the models the forms were trained for; changing an
//! order here silently breaks the corresponding model.

use crate::schema::{FeatureSchema, FieldSpec};
use crate::SchemaError;

/// Names of all built-in schemas
pub fn names() -> &'static [&'static str] {
    &[
        "diabetes",
        "heart",
        "liver",
        "parkinsons",
        "kidney",
        "alzheimer",
        "breast_cancer",
    ]
}

/// Look up a built-in schema by name; `None` when no such schema exists
pub fn by_name(name: &str) -> Option<Result<FeatureSchema, SchemaError>> {
    let schema = match name {
        "diabetes" => diabetes(),
        "heart" => heart(),
        "liver" => liver(),
        "parkinsons" => parkinsons(),
        "kidney" => kidney(),
        "alzheimer" => alzheimer(),
        "breast_cancer" => breast_cancer(),
        _ => return None,
    };
    Some(schema)
}

const FLAG: [f64; 2] = [0.0, 1.0];

/// Pima diabetes form (8 columns)
pub fn diabetes() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        "diabetes",
        vec![
            FieldSpec::numeric("Pregnancies").labelled("Number of Pregnancies"),
            FieldSpec::numeric("Glucose").labelled("Glucose Level"),
            FieldSpec::numeric("BloodPressure").labelled("Blood Pressure value"),
            FieldSpec::numeric("SkinThickness").labelled("Skin Thickness value"),
            FieldSpec::numeric("Insulin").labelled("Insulin Level"),
            FieldSpec::numeric("BMI").labelled("BMI value"),
            FieldSpec::numeric("DiabetesPedigreeFunction")
                .labelled("Diabetes Pedigree Function value"),
            FieldSpec::numeric("Age").labelled("Age of the Person"),
        ],
    )
}

/// Cleveland heart disease form (13 columns, coded choices kept numeric)
pub fn heart() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        "heart",
        vec![
            FieldSpec::numeric("age").labelled("Age").at_least(1.0),
            FieldSpec::numeric("sex")
                .labelled("Sex (1 = male, 0 = female)")
                .coded(&FLAG),
            FieldSpec::numeric("cp")
                .labelled("Chest Pain Type")
                .coded(&[0.0, 1.0, 2.0, 3.0]),
            FieldSpec::numeric("trestbps")
                .labelled("Resting Blood Pressure")
                .at_least(1.0),
            FieldSpec::numeric("chol")
                .labelled("Serum Cholestoral in mg/dl")
                .at_least(1.0),
            FieldSpec::numeric("fbs")
                .labelled("Fasting blood sugar > 120 mg/dL")
                .coded(&FLAG),
            FieldSpec::numeric("restecg")
                .labelled("Resting Electrocardiographic Results")
                .coded(&[0.0, 1.0, 2.0]),
            FieldSpec::numeric("thalach")
                .labelled("Maximum Heart Rate Achieved")
                .at_least(1.0),
            FieldSpec::numeric("exang")
                .labelled("Exercise Induced Angina")
                .coded(&FLAG),
            FieldSpec::numeric("oldpeak").labelled("ST Depression Induced by Exercise"),
            FieldSpec::numeric("slope")
                .labelled("Slope of the Peak Exercise ST Segment")
                .coded(&[0.0, 1.0, 2.0]),
            FieldSpec::numeric("ca")
                .labelled("Major Vessels Colored by Flourosopy")
                .coded(&[0.0, 1.0, 2.0, 3.0]),
            FieldSpec::numeric("thal").labelled("Thal").coded(&[1.0, 2.0, 3.0]),
        ],
    )
}

/// Indian liver patient form (10 columns, gender as a single 0/1 column)
pub fn liver() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        "liver",
        vec![
            FieldSpec::numeric("Age").with_default(65.0),
            FieldSpec::binary("Gender", "Male", "Female"),
            FieldSpec::numeric("Total_Bilirubin").labelled("Total Bilirubin").with_default(0.7),
            FieldSpec::numeric("Direct_Bilirubin").labelled("Direct Bilirubin").with_default(0.1),
            FieldSpec::numeric("Alkaline_Phosphotase")
                .labelled("Alkaline Phosphotase")
                .with_default(187.0),
            FieldSpec::numeric("Alamine_Aminotransferase")
                .labelled("Alamine Aminotransferase")
                .with_default(16.0),
            FieldSpec::numeric("Aspartate_Aminotransferase")
                .labelled("Aspartate Aminotransferase")
                .with_default(18.0),
            FieldSpec::numeric("Total_Proteins").labelled("Total Proteins").with_default(6.8),
            FieldSpec::numeric("Albumin").with_default(3.3),
            FieldSpec::numeric("Albumin_and_Globulin_Ratio")
                .labelled("Albumin and Globulin Ratio")
                .with_default(0.9),
        ],
    )
}

/// Oxford Parkinson's voice measurements (22 columns)
pub fn parkinsons() -> Result<FeatureSchema, SchemaError> {
    let fields = [
        "MDVP:Fo(Hz)",
        "MDVP:Fhi(Hz)",
        "MDVP:Flo(Hz)",
        "MDVP:Jitter(%)",
        "MDVP:Jitter(Abs)",
        "MDVP:RAP",
        "MDVP:PPQ",
        "Jitter:DDP",
        "MDVP:Shimmer",
        "MDVP:Shimmer(dB)",
        "Shimmer:APQ3",
        "Shimmer:APQ5",
        "MDVP:APQ",
        "Shimmer:DDA",
        "NHR",
        "HNR",
        "RPDE",
        "DFA",
        "spread1",
        "spread2",
        "D2",
        "PPE",
    ]
    .iter()
    .map(|name| FieldSpec::numeric(name).with_default(0.0))
    .collect();

    FeatureSchema::new("parkinsons", fields)
}

/// Chronic kidney disease form (24 columns, flags pre-coded as 0/1)
pub fn kidney() -> Result<FeatureSchema, SchemaError> {
    let flag = |name: &str, label: &str| {
        FieldSpec::numeric(name)
            .labelled(label)
            .coded(&FLAG)
            .with_default(0.0)
    };
    let grade = |name: &str, label: &str| {
        FieldSpec::numeric(name)
            .labelled(label)
            .coded(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .with_default(0.0)
    };

    FeatureSchema::new(
        "kidney",
        vec![
            FieldSpec::numeric("age").bounded(2.0, 100.0).with_default(22.0),
            FieldSpec::numeric("bp")
                .labelled("blood pressure (mm/Hg)")
                .bounded(45.0, 180.0)
                .with_default(66.0),
            FieldSpec::numeric("sg")
                .labelled("urine specific gravity")
                .bounded(1.005, 1.025)
                .with_default(1.005),
            grade("al", "albumin"),
            grade("su", "sugar"),
            flag("rbc", "red blood cells: abnormal (1) normal (0)"),
            flag("pc", "pus cell: abnormal (1) normal (0)"),
            flag("pcc", "pus cell clumps: present (1) not present (0)"),
            flag("ba", "bacteria: present (1) not present (0)"),
            FieldSpec::numeric("bgr")
                .labelled("blood glucose random (mgs/dl)")
                .bounded(70.0, 500.0)
                .with_default(131.0),
            FieldSpec::numeric("bu")
                .labelled("blood urea (mgs/dl)")
                .bounded(10.0, 309.0)
                .with_default(52.0),
            FieldSpec::numeric("sc")
                .labelled("serum creatinine (mgs/dl)")
                .bounded(0.4, 15.2)
                .with_default(2.2),
            FieldSpec::numeric("sod")
                .labelled("sodium (mEq/L)")
                .bounded(111.0, 150.0)
                .with_default(138.0),
            FieldSpec::numeric("pot")
                .labelled("potassium (mEq/L)")
                .bounded(2.5, 47.0)
                .with_default(4.6),
            FieldSpec::numeric("hemo")
                .labelled("hemoglobin (gms)")
                .bounded(3.1, 17.8)
                .with_default(13.7),
            FieldSpec::numeric("pcv")
                .labelled("packed cell volume")
                .bounded(16.0, 55.0)
                .with_default(30.0),
            FieldSpec::numeric("wc")
                .labelled("white blood cell count (cells/cumm)")
                .bounded(3000.0, 15000.0)
                .with_default(7000.0),
            FieldSpec::numeric("rc")
                .labelled("red blood cell count (millions/cumm)")
                .bounded(2.2, 6.9)
                .with_default(5.0),
            flag("htn", "hypertension: yes (1) no (0)"),
            flag("dm", "diabetes mellitus: yes (1) no (0)"),
            flag("cad", "coronary artery disease: yes (1) no (0)"),
            flag("appet", "appetite: good (1) poor (0)"),
            flag("pe", "pedal edema: yes (1) no (0)"),
            flag("ane", "anemia: yes (1) no (0)"),
        ],
    )
}

/// ADNI Alzheimer's form (22 columns after one-hot expansion)
pub fn alzheimer() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        "alzheimer",
        vec![
            FieldSpec::numeric("age").labelled("Age").bounded(0.0, 122.0).with_default(65.0),
            FieldSpec::numeric("education")
                .labelled("Years of Education")
                .at_least(0.0)
                .with_default(12.0),
            FieldSpec::numeric("mmse").labelled("MMSE Score").bounded(0.0, 30.0).with_default(0.0),
            FieldSpec::categorical("race", &["Asian", "Black", "White"])
                .labelled("Race Category")
                .with_prefix("PTRACCAT_"),
            FieldSpec::categorical("apoe_genotype", &["2,2", "2,3", "2,4", "3,3", "3,4", "4,4"])
                .labelled("APOE4 Genotype")
                .with_prefix("APOE Genotype_"),
            FieldSpec::categorical("ethnicity", &["Hisp/Latino", "Not Hisp/Latino", "Unknown"])
                .labelled("Ethnicity")
                .with_prefix("PTETHCAT_"),
            FieldSpec::categorical("apoe4", &["0", "1", "2"])
                .labelled("APOE Allele Type")
                .with_prefix("APOE4_"),
            FieldSpec::categorical("gender", &["Female", "Male"])
                .labelled("Gender")
                .with_prefix("PTGENDER_"),
            FieldSpec::categorical("imputed_genotype", &["True", "False"])
                .labelled("Imputed Genotype")
                .with_prefix("imputed_genotype_"),
        ],
    )
}

/// Wisconsin breast cancer cell nuclei measurements (30 columns)
pub fn breast_cancer() -> Result<FeatureSchema, SchemaError> {
    let measures = [
        ("radius", "Radius"),
        ("texture", "Texture"),
        ("perimeter", "Perimeter"),
        ("area", "Area"),
        ("smoothness", "Smoothness"),
        ("compactness", "Compactness"),
        ("concavity", "Concavity"),
        ("concave points", "Concave points"),
        ("symmetry", "Symmetry"),
        ("fractal_dimension", "Fractal dimension"),
    ];

    let fields = ["mean", "se", "worst"]
        .iter()
        .flat_map(|suffix| {
            measures.iter().map(move |(key, label)| {
                FieldSpec::numeric(&format!("{key}_{suffix}"))
                    .labelled(&format!("{label} ({suffix})"))
                    .at_least(0.0)
            })
        })
        .collect();

    FeatureSchema::new("breast_cancer", fields)
}
