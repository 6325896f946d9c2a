use crate::workflows::steps::values::{code_table, Coded, YesNo};

use super::domain::Claim;

code_table! {
    pub enum ClaimType {
        NonStandardMagistrate => ("non_standard_magistrate", "Non-standard magistrates' court payment"),
        BreachOfInjunction => ("breach_of_injunction", "Breach of injunction"),
        Supplemental => ("supplemental", "Supplemental claim"),
    }
}

impl ClaimType {
    /// Only these claim types can be completed through this service.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::NonStandardMagistrate | Self::BreachOfInjunction)
    }
}

code_table! {
    pub enum WorkType {
        AttendanceWithCounsel => ("attendance_with_counsel", "Attendance with counsel assigned"),
        AttendanceWithoutCounsel => ("attendance_without_counsel", "Attendance without counsel assigned"),
        Preparation => ("preparation", "Preparation"),
        Advocacy => ("advocacy", "Advocacy"),
        Travel => ("travel", "Travel"),
        Waiting => ("waiting", "Waiting"),
    }
}

impl WorkType {
    /// Whether the work type may be chosen for this claim.
    pub fn displayed_for(self, claim: &Claim) -> bool {
        match self {
            Self::AttendanceWithCounsel => claim.assigned_counsel == Some(YesNo::Yes),
            Self::Travel | Self::Waiting => claim.prog_stage_reached(),
            Self::AttendanceWithoutCounsel | Self::Preparation | Self::Advocacy => true,
        }
    }
}

code_table! {
    pub enum DisbursementType {
        Car => ("car", "Car mileage"),
        Motorcycle => ("motorcycle", "Motorcycle mileage"),
        Bike => ("bike", "Bike mileage"),
        Other => ("other", "Other"),
    }
}

impl DisbursementType {
    pub fn is_mileage(self) -> bool {
        self != Self::Other
    }
}

code_table! {
    pub enum OtherDisbursementType {
        Accountants => ("accountants", "Accountants"),
        ComputerExperts => ("computer_experts", "Computer experts"),
        DnaTesting => ("dna_testing", "DNA testing"),
        FingerprintExpert => ("fingerprint_expert", "Fingerprint expert"),
        MedicalRecords => ("medical_records", "Medical records"),
        Meteorologist => ("meteorologist", "Meteorologist"),
        Pathologist => ("pathologist", "Pathologist"),
        Psychiatric => ("psychiatric_reports", "Psychiatric reports"),
        Psychological => ("psychological_report", "Psychological report"),
        TranscriptionRecording => ("transcription_recording", "Transcription (recording)"),
        Translator => ("translator", "Translator"),
        VoiceRecognition => ("voice_recognition", "Voice recognition"),
        Custom => ("custom", "Other"),
    }
}

code_table! {
    pub enum Plea {
        Guilty => ("guilty", "Guilty plea"),
        IndicatedGuilty => ("indicated_guilty", "Indicated guilty plea"),
        BindOver => ("bind_over", "Bind over"),
        Breach => ("breach", "Breach"),
        NoFurtherAction => ("no_further_action", "No further action"),
        ArrestWarrant => ("arrest_warrant", "Arrest warrant issued or adjourned indefinitely"),
        DeferredSentence => ("deferred_sentence", "Deferred sentence hearing"),
        ChangeSolicitor => ("change_solicitor", "Change of solicitor"),
        NotGuilty => ("not_guilty", "Not guilty plea"),
        CrackedTrial => ("cracked_trial", "Cracked trial"),
        ClearedMatter => ("cleared_matter", "Cleared matter"),
        Discontinuance => ("discontinuance", "Discontinuance"),
        MixedPleas => ("mixed_pleas", "Mixed pleas"),
    }
}

code_table! {
    pub enum PleaCategory {
        GuiltyPleas => ("category_1a", "Category 1A"),
        NotGuiltyPleas => ("category_2a", "Category 2A"),
    }
}

impl Plea {
    pub fn category(self) -> PleaCategory {
        match self {
            Self::Guilty
            | Self::IndicatedGuilty
            | Self::BindOver
            | Self::Breach
            | Self::NoFurtherAction
            | Self::ArrestWarrant
            | Self::DeferredSentence
            | Self::ChangeSolicitor => PleaCategory::GuiltyPleas,
            Self::NotGuilty
            | Self::CrackedTrial
            | Self::ClearedMatter
            | Self::Discontinuance
            | Self::MixedPleas => PleaCategory::NotGuiltyPleas,
        }
    }
}

code_table! {
    pub enum ReasonForClaim {
        CoreCostsExceedHigherLimit => ("core_costs_exceed_higher_limit", "Core costs exceed the higher limit"),
        EnhancedRates => ("enhanced_rates_claimed", "Enhanced rates claimed"),
        CounselOrAgentAssigned => ("counsel_or_agent_assigned", "Counsel or agent assigned"),
        RepresentationOrderWithdrawn => ("representation_order_withdrawn", "Representation order withdrawn"),
        ExtraditionProceedings => ("extradition", "Extradition"),
        Other => ("other", "Other"),
    }
}

code_table! {
    pub enum MatterType {
        OffencesAgainstThePerson => ("1", "Offences against the person"),
        Homicide => ("2", "Homicide and related grave offences"),
        SexualOffences => ("3", "Sexual offences and child abuse"),
        Robbery => ("4", "Robbery"),
        Burglary => ("5", "Burglary"),
        CriminalDamage => ("6", "Criminal damage"),
        Theft => ("7", "Theft (including taking vehicle without consent)"),
        Fraud => ("8", "Fraud and forgery"),
        PublicOrder => ("9", "Public order offences"),
        Drugs => ("10", "Drug offences"),
        Driving => ("11", "Driving and motor vehicle offences (other than theft)"),
        OtherOffences => ("12", "Other offences"),
        Terrorism => ("13", "Terrorism"),
        AntiSocialBehaviour => ("14", "Anti-social behaviour orders"),
        SexualOffenderOrders => ("15", "Sexual offender orders"),
        OtherPrescribed => ("16", "Other prescribed proceedings"),
    }
}

code_table! {
    pub enum OutcomeCode {
        Cp01 => ("CP01", "Arrest warrant issued/adjourned indefinitely"),
        Cp02 => ("CP02", "Change of solicitor"),
        Cp03 => ("CP03", "Representation order withdrawn"),
        Cp04 => ("CP04", "Trial cracked at/after arrival - guilty plea"),
        Cp05 => ("CP05", "Trial cracked before arrival - guilty plea"),
        Cp06 => ("CP06", "Defendant failed to attend trial"),
        Cp07 => ("CP07", "Trial cracked - prosecution withdrew"),
        Cp08 => ("CP08", "Bind over"),
        Cp09 => ("CP09", "Guilty plea to substitute charge"),
        Cp10 => ("CP10", "Discontinued / withdrawn"),
        Cp11 => ("CP11", "Case dismissed"),
        Cp12 => ("CP12", "Proceedings stayed"),
        Cp13 => ("CP13", "Trial - not guilty"),
    }
}

code_table! {
    pub enum Gender {
        Male => ("m", "Male"),
        Female => ("f", "Female"),
        PreferNotToSay => ("prefer_not_to_say", "Prefer not to say"),
    }
}

code_table! {
    pub enum EthnicGroup {
        WhiteBritish => ("01_white_british", "White British"),
        WhiteIrish => ("02_white_irish", "White Irish"),
        WhiteOther => ("03_white_other", "White other"),
        MixedWhiteBlackCaribbean => ("04_mixed_white_and_black_caribbean", "Mixed white and black Caribbean"),
        MixedWhiteBlackAfrican => ("05_mixed_white_and_black_african", "Mixed white and black African"),
        MixedWhiteAsian => ("06_mixed_white_and_asian", "Mixed white and Asian"),
        MixedOther => ("07_mixed_other", "Mixed other"),
        AsianIndian => ("08_asian_indian", "Asian or Asian British Indian"),
        AsianPakistani => ("09_asian_pakistani", "Asian or Asian British Pakistani"),
        AsianBangladeshi => ("10_asian_bangladeshi", "Asian or Asian British Bangladeshi"),
        AsianOther => ("11_asian_other", "Asian other"),
        BlackCaribbean => ("12_black_caribbean", "Black or black British Caribbean"),
        BlackAfrican => ("13_black_african", "Black or black British African"),
        BlackOther => ("14_black_other", "Black other"),
        Chinese => ("15_chinese", "Chinese"),
        Other => ("16_other", "Other"),
        PreferNotToSay => ("99_prefer_not_to_say", "Prefer not to say"),
    }
}

code_table! {
    pub enum Disability {
        Yes => ("y", "Yes"),
        No => ("n", "No"),
        PreferNotToSay => ("prefer_not_to_say", "Prefer not to say"),
    }
}

code_table! {
    /// Fixed keys for the two counter line items on a claim.
    pub enum LetterOrCall {
        Letters => ("letters", "Letters"),
        Calls => ("calls", "Calls"),
    }
}

pub fn all_codes<T: Coded>() -> Vec<&'static str> {
    T::ALL.iter().map(|value| value.code()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplemental_claims_are_recognised_but_unsupported() {
        let claim_type = ClaimType::from_code("supplemental").expect("known code");
        assert!(!claim_type.is_supported());
        assert!(ClaimType::BreachOfInjunction.is_supported());
    }

    #[test]
    fn pleas_map_to_categories() {
        assert_eq!(Plea::ArrestWarrant.category(), PleaCategory::GuiltyPleas);
        assert_eq!(Plea::CrackedTrial.category(), PleaCategory::NotGuiltyPleas);
    }

    #[test]
    fn matter_types_are_numbered() {
        assert_eq!(all_codes::<MatterType>().len(), 16);
        assert_eq!(MatterType::from_code("10"), Some(MatterType::Drugs));
    }
}
