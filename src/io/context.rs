use crate::model::types::ResidueType;
use std::collections::HashMap;

/// Residue-name normalization shared by every reader.
///
/// Maps standard monomer codes and common chemically modified monomers onto their parent
/// [`ResidueType`]. Codes without an entry resolve to [`ResidueType::Unknown`], which keeps
/// the residue in the structure while excluding it from descriptor computation.
#[derive(Debug, Clone)]
pub struct IoContext {
    type_map: HashMap<String, ResidueType>,
}

impl IoContext {
    pub fn new_default() -> Self {
        let mut type_map = HashMap::new();

        macro_rules! register_standard {
            ($ty:expr) => {
                type_map.insert($ty.code().to_string(), $ty);
            };
        }

        macro_rules! register_alias {
            ($alias:expr, $ty:expr) => {
                type_map.insert($alias.to_string(), $ty);
            };
        }

        for ty in ResidueType::ALL {
            if !ty.is_unknown() {
                register_standard!(ty);
            }
        }

        register_alias!("AIB", ResidueType::ALA);
        register_alias!("ALM", ResidueType::ALA);
        register_alias!("DAL", ResidueType::ALA);
        register_alias!("MAA", ResidueType::ALA);

        register_alias!("ACL", ResidueType::ARG);
        register_alias!("AGM", ResidueType::ARG);
        register_alias!("ARM", ResidueType::ARG);
        register_alias!("DAR", ResidueType::ARG);
        register_alias!("HAR", ResidueType::ARG);
        register_alias!("HMR", ResidueType::ARG);

        register_alias!("MEN", ResidueType::ASN);
        register_alias!("DSG", ResidueType::ASN);

        register_alias!("2AS", ResidueType::ASP);
        register_alias!("ASA", ResidueType::ASP);
        register_alias!("ASB", ResidueType::ASP);
        register_alias!("ASK", ResidueType::ASP);
        register_alias!("ASL", ResidueType::ASP);
        register_alias!("ASQ", ResidueType::ASP);
        register_alias!("BHD", ResidueType::ASP);
        register_alias!("DAS", ResidueType::ASP);
        register_alias!("DSP", ResidueType::ASP);
        register_alias!("IAS", ResidueType::ASP);

        register_alias!("BCS", ResidueType::CYS);
        register_alias!("BUC", ResidueType::CYS);
        register_alias!("C5C", ResidueType::CYS);
        register_alias!("C6C", ResidueType::CYS);
        register_alias!("CAS", ResidueType::CYS);
        register_alias!("CCS", ResidueType::CYS);
        register_alias!("CEA", ResidueType::CYS);
        register_alias!("CME", ResidueType::CYS);
        register_alias!("CSO", ResidueType::CYS);
        register_alias!("CSP", ResidueType::CYS);
        register_alias!("CSS", ResidueType::CYS);
        register_alias!("CSW", ResidueType::CYS);
        register_alias!("CSX", ResidueType::CYS);
        register_alias!("CY1", ResidueType::CYS);
        register_alias!("CY3", ResidueType::CYS);
        register_alias!("CYG", ResidueType::CYS);
        register_alias!("CYQ", ResidueType::CYS);
        register_alias!("DCY", ResidueType::CYS);
        register_alias!("OCS", ResidueType::CYS);
        register_alias!("SCH", ResidueType::CYS);
        register_alias!("SCS", ResidueType::CYS);
        register_alias!("SCY", ResidueType::CYS);
        register_alias!("SMC", ResidueType::CYS);
        register_alias!("SOC", ResidueType::CYS);

        register_alias!("5HP", ResidueType::GLU);
        register_alias!("CGU", ResidueType::GLU);
        register_alias!("DGL", ResidueType::GLU);
        register_alias!("GGL", ResidueType::GLU);
        register_alias!("GMA", ResidueType::GLU);
        register_alias!("PCA", ResidueType::GLU);

        register_alias!("DGN", ResidueType::GLN);

        register_alias!("GL3", ResidueType::GLY);
        register_alias!("GLZ", ResidueType::GLY);
        register_alias!("GSC", ResidueType::GLY);
        register_alias!("MPQ", ResidueType::GLY);
        register_alias!("MSA", ResidueType::GLY);
        register_alias!("NMC", ResidueType::GLY);
        register_alias!("SAR", ResidueType::GLY);

        register_alias!("3AH", ResidueType::HIS);
        register_alias!("DHI", ResidueType::HIS);
        register_alias!("HIC", ResidueType::HIS);
        register_alias!("MHS", ResidueType::HIS);
        register_alias!("NEM", ResidueType::HIS);
        register_alias!("NEP", ResidueType::HIS);

        register_alias!("DIL", ResidueType::ILE);
        register_alias!("IIL", ResidueType::ILE);

        register_alias!("BUG", ResidueType::LEU);
        register_alias!("CLE", ResidueType::LEU);
        register_alias!("DLE", ResidueType::LEU);
        register_alias!("MLE", ResidueType::LEU);
        register_alias!("NLE", ResidueType::LEU);

        register_alias!("ALY", ResidueType::LYS);
        register_alias!("DLY", ResidueType::LYS);
        register_alias!("KCX", ResidueType::LYS);
        register_alias!("LLP", ResidueType::LYS);
        register_alias!("LLY", ResidueType::LYS);
        register_alias!("LYZ", ResidueType::LYS);
        register_alias!("MLY", ResidueType::LYS);
        register_alias!("M3L", ResidueType::LYS);
        register_alias!("SHR", ResidueType::LYS);
        register_alias!("TRG", ResidueType::LYS);

        register_alias!("CXM", ResidueType::MET);
        register_alias!("FME", ResidueType::MET);
        register_alias!("MSE", ResidueType::MET);
        register_alias!("OMT", ResidueType::MET);

        register_alias!("DAH", ResidueType::PHE);
        register_alias!("DPN", ResidueType::PHE);
        register_alias!("HPQ", ResidueType::PHE);
        register_alias!("PHI", ResidueType::PHE);
        register_alias!("PHL", ResidueType::PHE);

        register_alias!("DPR", ResidueType::PRO);
        register_alias!("HYP", ResidueType::PRO);

        register_alias!("DSN", ResidueType::SER);
        register_alias!("MIS", ResidueType::SER);
        register_alias!("OAS", ResidueType::SER);
        register_alias!("SAC", ResidueType::SER);
        register_alias!("SEL", ResidueType::SER);
        register_alias!("SEP", ResidueType::SER);
        register_alias!("SVA", ResidueType::SER);

        register_alias!("ALO", ResidueType::THR);
        register_alias!("BMT", ResidueType::THR);
        register_alias!("DTH", ResidueType::THR);
        register_alias!("TPO", ResidueType::THR);

        register_alias!("DTR", ResidueType::TRP);
        register_alias!("HTR", ResidueType::TRP);
        register_alias!("LTR", ResidueType::TRP);
        register_alias!("TPL", ResidueType::TRP);
        register_alias!("TRO", ResidueType::TRP);

        register_alias!("DTY", ResidueType::TYR);
        register_alias!("IYR", ResidueType::TYR);
        register_alias!("PAQ", ResidueType::TYR);
        register_alias!("PTR", ResidueType::TYR);
        register_alias!("STY", ResidueType::TYR);
        register_alias!("TYQ", ResidueType::TYR);
        register_alias!("TYS", ResidueType::TYR);

        register_alias!("DIV", ResidueType::VAL);
        register_alias!("DVA", ResidueType::VAL);
        register_alias!("MVA", ResidueType::VAL);

        register_alias!("1MA", ResidueType::A);
        register_alias!("MIA", ResidueType::A);
        register_alias!("6MA", ResidueType::A);

        register_alias!("5MC", ResidueType::C);
        register_alias!("OMC", ResidueType::C);
        register_alias!("CBR", ResidueType::C);

        register_alias!("1MG", ResidueType::G);
        register_alias!("2MG", ResidueType::G);
        register_alias!("7MG", ResidueType::G);
        register_alias!("M2G", ResidueType::G);
        register_alias!("OMG", ResidueType::G);
        register_alias!("YG", ResidueType::G);

        register_alias!("4SU", ResidueType::U);
        register_alias!("5MU", ResidueType::U);
        register_alias!("H2U", ResidueType::U);
        register_alias!("OMU", ResidueType::U);
        register_alias!("PSU", ResidueType::U);

        register_alias!("5CM", ResidueType::DC);
        register_alias!("8OG", ResidueType::DG);
        register_alias!("BRU", ResidueType::DT);

        Self { type_map }
    }

    /// Resolves a raw monomer code, falling back to [`ResidueType::Unknown`].
    pub fn classify_residue(&self, name: &str) -> ResidueType {
        let upper = name.trim().to_ascii_uppercase();
        self.type_map
            .get(&upper)
            .copied()
            .unwrap_or(ResidueType::Unknown)
    }
}

impl Default for IoContext {
    fn default() -> Self {
        Self::new_default()
    }
}
