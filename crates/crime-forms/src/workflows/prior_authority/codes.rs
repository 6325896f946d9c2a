use crate::workflows::steps::values::code_table;

code_table! {
    pub enum ServiceType {
        Pathologist => ("pathologist", "Pathologist"),
        PsychiatricReport => ("psychiatric_report", "Psychiatric report"),
        Psychologist => ("psychologist", "Psychologist"),
        ForensicScientist => ("forensic_scientist", "Forensic scientist"),
        ComputerExpert => ("computer_expert", "Computer expert"),
        CellSiteAnalysis => ("cell_site_analysis", "Cell site analysis"),
        Interpreter => ("interpreter", "Interpreter"),
        Transcription => ("transcription", "Transcription"),
        AccidentReconstruction => ("accident_reconstruction", "Accident reconstruction"),
        Custom => ("custom", "Other service"),
    }
}

impl ServiceType {
    /// Custom services carry a free-text name instead of a catalogue entry.
    pub fn needs_name(self) -> bool {
        self == Self::Custom
    }
}

code_table! {
    pub enum CostType {
        PerHour => ("per_hour", "Per hour"),
        PerItem => ("per_item", "Per item"),
    }
}
